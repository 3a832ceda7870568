use crate::keyboard::CharSource;
use crate::vga_buffer::Console;

/// Marks the end of a line in an input buffer. The unused tail stays zero.
pub const LINE_TERMINATOR: u8 = b'\r';
const BACKSPACE: u8 = 0x08;

/// Reads one line from `source` into `buffer`, echoing it on `console`.
///
/// The buffer is zeroed first. Reading stops at a carriage return or when all but the last slot
/// are filled; the terminator then goes right after the last stored character. Returns how many
/// characters were stored.
pub fn read_line<S: CharSource>(console: &mut Console, source: &mut S, buffer: &mut [u8]) -> usize {
    buffer.fill(0);
    let limit = match buffer.len().checked_sub(1) {
        Some(limit) => limit,
        None => return 0,
    };

    let mut index = 0;
    while index < limit {
        match source.read_char() {
            LINE_TERMINATOR => break,
            BACKSPACE => {
                if index > 0 {
                    console.backspace();
                    index -= 1;
                    buffer[index] = 0;
                }
            }
            // unmapped keys come through as zero
            0 | 0x80..=0xff => {}
            c => {
                console.put_char(c);
                buffer[index] = c;
                index += 1;
            }
        }
    }
    buffer[index] = LINE_TERMINATOR;
    index
}

/// The characters of a line, up to its terminator or the zero fill.
pub fn line_text(buffer: &[u8]) -> &[u8] {
    let len = buffer
        .iter()
        .position(|&b| b == LINE_TERMINATOR || b == 0)
        .unwrap_or(buffer.len());
    &buffer[..len]
}

#[cfg(test)]
struct Typed<'a> {
    keys: &'a [u8],
    next: usize,
}

#[cfg(test)]
impl<'a> Typed<'a> {
    fn new(keys: &'a [u8]) -> Typed<'a> {
        Typed { keys, next: 0 }
    }
}

#[cfg(test)]
impl CharSource for Typed<'_> {
    fn read_char(&mut self) -> u8 {
        let c = self.keys[self.next];
        self.next += 1;
        c
    }
}

#[test_case]
fn test_reads_terminated_line() {
    use crate::vga_buffer::Buffer;

    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    let mut keys = Typed::new(b"help\r");
    let mut line = [0xaau8; 10];

    let count = read_line(&mut console, &mut keys, &mut line);

    assert_eq!(count, 4);
    assert_eq!(&line[..5], b"help\r");
    assert!(line[5..].iter().all(|&b| b == 0));
    assert_eq!(line_text(&line), b"help");
    assert_eq!(console.cursor(), (0, 4));
    assert_eq!(console.read_cell(0, 0).ascii_character, b'h');
}

#[test_case]
fn test_backspace_on_empty_line_is_ignored() {
    use crate::vga_buffer::Buffer;

    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    console.write_string("> ");
    let mut keys = Typed::new(b"\x08\x08ok\r");
    let mut line = [0u8; 6];

    let count = read_line(&mut console, &mut keys, &mut line);

    assert_eq!(count, 2);
    assert_eq!(line_text(&line), b"ok");
    // the prompt in front of the line stays intact
    assert_eq!(console.read_cell(0, 0).ascii_character, b'>');
    assert_eq!(console.cursor(), (0, 4));
}

#[test_case]
fn test_backspace_erases_previous_character() {
    use crate::vga_buffer::Buffer;

    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    let mut keys = Typed::new(b"helx\x08p\r");
    let mut line = [0u8; 10];

    read_line(&mut console, &mut keys, &mut line);

    assert_eq!(line_text(&line), b"help");
    assert_eq!(&line[..6], b"help\r\0");
    assert_eq!(console.read_cell(3, 0).ascii_character, b'p');
    assert_eq!(console.cursor(), (0, 4));
}

#[test_case]
fn test_unmapped_and_high_bytes_are_dropped() {
    use crate::vga_buffer::Buffer;

    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    let mut keys = Typed::new(b"a\0\xfeb\r");
    let mut line = [0u8; 10];

    assert_eq!(read_line(&mut console, &mut keys, &mut line), 2);
    assert_eq!(line_text(&line), b"ab");
}

#[test_case]
fn test_full_buffer_keeps_room_for_terminator() {
    use crate::vga_buffer::Buffer;

    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    let mut keys = Typed::new(b"abcdefgh");
    let mut line = [0u8; 5];

    let count = read_line(&mut console, &mut keys, &mut line);

    assert_eq!(count, 4);
    assert_eq!(&line, b"abcd\r");
    assert_eq!(keys.next, 4);
}

#[test_case]
fn test_empty_buffer_reads_nothing() {
    use crate::vga_buffer::Buffer;

    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    let mut keys = Typed::new(b"");
    let mut line: [u8; 0] = [];

    assert_eq!(read_line(&mut console, &mut keys, &mut line), 0);
}
