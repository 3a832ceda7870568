use x86_64::instructions::port::PortReadOnly;

/* PS/2 controller registers. Bit 0 of the status register says the output buffer holds a byte
that has not been read from the data register yet. */
const STATUS_PORT: u16 = 0x64;
const DATA_PORT: u16 = 0x60;
pub const STATUS_OUTPUT_FULL: u8 = 0x01;

/// Highest scancode that maps to a key. Releases (bit 7 set) and prefixes are above it.
pub const MAX_SCANCODE: u8 = 0x58;

const EXTENDED_PREFIX: u8 = 0xe0;

/// Read side of a keyboard controller.
pub trait KeyboardController {
    fn status(&mut self) -> u8;
    fn data(&mut self) -> u8;
}

/// The legacy PS/2 controller behind ports 0x64 and 0x60.
pub struct Ps2Controller {
    status: PortReadOnly<u8>,
    data: PortReadOnly<u8>,
}

impl Ps2Controller {
    pub fn new() -> Ps2Controller {
        Ps2Controller {
            status: PortReadOnly::new(STATUS_PORT),
            data: PortReadOnly::new(DATA_PORT),
        }
    }
}

impl KeyboardController for Ps2Controller {
    fn status(&mut self) -> u8 {
        unsafe { self.status.read() }
    }

    fn data(&mut self) -> u8 {
        unsafe { self.data.read() }
    }
}

/// Replays a fixed scancode sequence, reporting an empty output buffer once it runs dry.
pub struct ScriptedController<'a> {
    scancodes: &'a [u8],
    next: usize,
}

impl<'a> ScriptedController<'a> {
    pub fn new(scancodes: &'a [u8]) -> ScriptedController<'a> {
        ScriptedController { scancodes, next: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.scancodes.len() - self.next
    }
}

impl KeyboardController for ScriptedController<'_> {
    fn status(&mut self) -> u8 {
        if self.next < self.scancodes.len() {
            STATUS_OUTPUT_FULL
        } else {
            0
        }
    }

    fn data(&mut self) -> u8 {
        match self.scancodes.get(self.next) {
            Some(&code) => {
                self.next += 1;
                code
            }
            None => 0,
        }
    }
}

/// Maps a make code to a character. Zero means the key produces no character.
pub trait ScancodeTranslator {
    fn translate(&self, scancode: u8) -> u8;
}

/* Scan code set 1, US QWERTY, no modifiers. Enter yields a carriage return and Backspace 0x08;
Escape, Tab, the modifiers and the function keys yield nothing. */
static US_SCANCODE_SET1: [u8; MAX_SCANCODE as usize + 1] = [
    0, 0, b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'0', b'-', b'=', 0x08, 0,
    b'q', b'w', b'e', b'r', b't', b'y', b'u', b'i', b'o', b'p', b'[', b']', b'\r', 0,
    b'a', b's', b'd', b'f', b'g', b'h', b'j', b'k', b'l', b';', b'\'', b'`', 0, b'\\',
    b'z', b'x', b'c', b'v', b'b', b'n', b'm', b',', b'.', b'/', 0, b'*', 0, b' ',
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    b'7', b'8', b'9', b'-', b'4', b'5', b'6', b'+', b'1', b'2', b'3', b'0', b'.',
    0, 0, 0, 0, 0,
];

#[derive(Debug, Default, Clone, Copy)]
pub struct UsLayout;

impl ScancodeTranslator for UsLayout {
    fn translate(&self, scancode: u8) -> u8 {
        US_SCANCODE_SET1
            .get(scancode as usize)
            .copied()
            .unwrap_or(0)
    }
}

/// Anything that hands out one character per call, blocking until it has one.
pub trait CharSource {
    fn read_char(&mut self) -> u8;
}

/// Turns controller output into characters.
pub struct InputReader<C, T = UsLayout> {
    controller: C,
    translator: T,
    skip_next: bool,
}

impl<C: KeyboardController> InputReader<C> {
    pub fn new(controller: C) -> InputReader<C> {
        InputReader::with_translator(controller, UsLayout)
    }
}

impl<C: KeyboardController, T: ScancodeTranslator> InputReader<C, T> {
    pub fn with_translator(controller: C, translator: T) -> InputReader<C, T> {
        InputReader {
            controller,
            translator,
            skip_next: false,
        }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Checks the controller once. Returns a character only if a mapped key was pressed.
    pub fn poll(&mut self) -> Option<u8> {
        if self.controller.status() & STATUS_OUTPUT_FULL == 0 {
            return None;
        }
        let scancode = self.controller.data();

        // The byte after an 0xE0 prefix names an extended key; none of them are mapped.
        if self.skip_next {
            self.skip_next = false;
            return None;
        }
        if scancode > MAX_SCANCODE {
            self.skip_next = scancode == EXTENDED_PREFIX;
            return None;
        }
        Some(self.translator.translate(scancode))
    }

    /// Like `read_char`, but gives up after `max_polls` status checks.
    pub fn read_char_timeout(&mut self, max_polls: usize) -> Option<u8> {
        for _ in 0..max_polls {
            if let Some(c) = self.poll() {
                return Some(c);
            }
            core::hint::spin_loop();
        }
        None
    }
}

impl<C: KeyboardController, T: ScancodeTranslator> CharSource for InputReader<C, T> {
    /* Busy-waits until a key arrives. There is no timeout: the CPU does nothing else meanwhile. */
    fn read_char(&mut self) -> u8 {
        loop {
            if let Some(c) = self.poll() {
                return c;
            }
            core::hint::spin_loop();
        }
    }
}

#[test_case]
fn test_translates_make_codes() {
    let layout = UsLayout;
    assert_eq!(layout.translate(0x23), b'h');
    assert_eq!(layout.translate(0x12), b'e');
    assert_eq!(layout.translate(0x26), b'l');
    assert_eq!(layout.translate(0x19), b'p');
    assert_eq!(layout.translate(0x1c), b'\r');
    assert_eq!(layout.translate(0x0e), 0x08);
    assert_eq!(layout.translate(0x39), b' ');
    assert_eq!(layout.translate(0x0b), b'0');
    assert_eq!(layout.translate(0x52), b'0');
    assert_eq!(layout.translate(0x01), 0);
    assert_eq!(layout.translate(0x58), 0);
}

#[test_case]
fn test_read_char_skips_releases() {
    // 'h' press, 'h' release, 'i' press
    let mut reader = InputReader::new(ScriptedController::new(&[0x23, 0xa3, 0x17]));
    assert_eq!(reader.read_char(), b'h');
    assert_eq!(reader.read_char(), b'i');
    assert_eq!(reader.controller().remaining(), 0);
}

#[test_case]
fn test_extended_keys_are_dropped() {
    // arrow up (E0 48) would otherwise read as keypad 8
    let mut reader = InputReader::new(ScriptedController::new(&[0xe0, 0x48, 0xe0, 0xc8, 0x1e]));
    assert_eq!(reader.read_char(), b'a');
}

#[test_case]
fn test_poll_without_data() {
    let mut reader = InputReader::new(ScriptedController::new(&[]));
    assert_eq!(reader.poll(), None);
}

#[test_case]
fn test_read_char_timeout_gives_up() {
    let mut reader = InputReader::new(ScriptedController::new(&[0x9e, 0xaa]));
    assert_eq!(reader.read_char_timeout(10), None);

    let mut reader = InputReader::new(ScriptedController::new(&[0x9e, 0x1e]));
    assert_eq!(reader.read_char_timeout(1), None);
    assert_eq!(reader.read_char_timeout(1), Some(b'a'));
}
