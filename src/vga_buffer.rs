use core::fmt;
use volatile::Volatile;

use crate::line_editor::LINE_TERMINATOR;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)] // each variant fits in a nibble, but Rust has no u4 so we store a u8
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

/// A VGA attribute byte: background in the high nibble, foreground in the low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }

    pub const fn from_attribute(attribute: u8) -> ColorCode {
        ColorCode(attribute)
    }

    pub const fn attribute(self) -> u8 {
        self.0
    }
}

/* Colors the console starts with and returns to after highlighted output. */
pub const DEFAULT_COLOR: ColorCode = ColorCode::new(Color::LightGray, Color::Black);

/* One display cell. With the C layout the character lands in the low byte and the attribute in the
high byte of the 16-bit word the VGA hardware reads. */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ScreenChar {
    pub ascii_character: u8,
    pub color_code: ColorCode,
}

impl ScreenChar {
    pub const fn blank(color_code: ColorCode) -> ScreenChar {
        ScreenChar {
            ascii_character: b' ',
            color_code,
        }
    }
}

pub const BUFFER_HEIGHT: usize = 25;
pub const BUFFER_WIDTH: usize = 80;

const VGA_BUFFER_ADDR: usize = 0xb8000;

/// The cell grid, laid out exactly like VGA text memory.
#[repr(transparent)]
pub struct Buffer {
    chars: [[Volatile<ScreenChar>; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

impl Buffer {
    /// An off-screen grid in ordinary memory, every cell a blank at the default color.
    pub fn new() -> Buffer {
        Buffer {
            chars: core::array::from_fn(|_| {
                core::array::from_fn(|_| Volatile::new(ScreenChar::blank(DEFAULT_COLOR)))
            }),
        }
    }
}

/* The console owns the cursor and the default color and borrows the grid it draws into. The kernel
hands it the hardware buffer; tests hand it a `Buffer::new()`. */
pub struct Console<'a> {
    row: usize,
    column: usize,
    color_code: ColorCode,
    buffer: &'a mut Buffer,
}

impl<'a> Console<'a> {
    pub fn new(buffer: &'a mut Buffer) -> Console<'a> {
        Console {
            row: 0,
            column: 0,
            color_code: DEFAULT_COLOR,
            buffer,
        }
    }

    /// Homes the cursor, restores the default color and blanks every cell.
    pub fn initialize(&mut self) {
        self.row = 0;
        self.column = 0;
        self.color_code = DEFAULT_COLOR;
        let blank = ScreenChar::blank(self.color_code);
        for row in self.buffer.chars.iter_mut() {
            for cell in row.iter_mut() {
                cell.write(blank);
            }
        }
    }

    /// Changes the color of subsequent writes. Cells already on screen keep theirs.
    pub fn set_color(&mut self, color_code: ColorCode) {
        self.color_code = color_code;
    }

    pub fn set_colors(&mut self, foreground: Color, background: Color) {
        self.set_color(ColorCode::new(foreground, background));
    }

    pub fn color(&self) -> ColorCode {
        self.color_code
    }

    /// Cursor position as `(row, column)`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.column)
    }

    /// Writes one cell. The caller guarantees `x < BUFFER_WIDTH` and `y < BUFFER_HEIGHT`;
    /// anything else panics.
    pub fn write_cell(&mut self, byte: u8, color_code: ColorCode, x: usize, y: usize) {
        self.buffer.chars[y][x].write(ScreenChar {
            ascii_character: byte,
            color_code,
        });
    }

    pub fn read_cell(&self, x: usize, y: usize) -> ScreenChar {
        self.buffer.chars[y][x].read()
    }

    /* Moves every row up by one. The bottom row is left as it was, so whoever scrolls must clear it
    before writing there. */
    pub fn scroll_up(&mut self) {
        for row in 1..BUFFER_HEIGHT {
            for col in 0..BUFFER_WIDTH {
                let character = self.buffer.chars[row][col].read();
                self.buffer.chars[row - 1][col].write(character);
            }
        }
    }

    pub fn clear_line(&mut self, y: usize) {
        let blank = ScreenChar::blank(self.color_code);
        for col in 0..BUFFER_WIDTH {
            self.buffer.chars[y][col].write(blank);
        }
    }

    pub fn clear_screen(&mut self) {
        for row in 0..BUFFER_HEIGHT {
            self.clear_line(row);
        }
        self.row = 0;
        self.column = 0;
    }

    pub fn put_char(&mut self, byte: u8) {
        // The bottom row is a landing strip: reaching it scrolls before anything is drawn.
        if self.row == BUFFER_HEIGHT - 1 {
            self.scroll_up();
            self.clear_line(BUFFER_HEIGHT - 1);
            self.row -= 1;
            self.column = 0;
        }

        match byte {
            b'\n' => {
                self.row += 1;
                self.column = 0;
            }
            byte => {
                self.write_cell(byte, self.color_code, self.column, self.row);
                self.column += 1;
                if self.column == BUFFER_WIDTH {
                    self.column = 0;
                    self.row += 1;
                }
            }
        }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.put_char(byte);
        }
    }

    /// Writes a byte string up to its first zero byte or line terminator.
    pub fn write_text(&mut self, bytes: &[u8]) {
        let len = bytes
            .iter()
            .position(|&b| b == 0 || b == LINE_TERMINATOR)
            .unwrap_or(bytes.len());
        self.write(&bytes[..len]);
    }

    pub fn write_string(&mut self, s: &str) {
        for byte in s.bytes() {
            match byte {
                // printable ASCII byte or newline
                0x20..=0x7e | b'\n' => self.put_char(byte),
                // anything else shows up as ■ (0xfe in the VGA code page)
                _ => self.put_char(0xfe),
            }
        }
    }

    /// Steps the cursor back one cell and blanks it. Stops at the top-left corner.
    pub fn backspace(&mut self) {
        if self.column > 0 {
            self.column -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.column = BUFFER_WIDTH - 1;
        } else {
            return;
        }
        self.write_cell(b' ', self.color_code, self.column, self.row);
    }
}

impl fmt::Write for Console<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}

use lazy_static::lazy_static;
use spin::Mutex;

/* The console on the real VGA memory. The shell borrows it for the whole session; the print macros
and the panic handler reach it through the same lock. */
lazy_static! {
    pub static ref CONSOLE: Mutex<Console<'static>> =
        Mutex::new(Console::new(unsafe { &mut *(VGA_BUFFER_ADDR as *mut Buffer) }));
}

pub fn init() {
    CONSOLE.lock().initialize();
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::vga_buffer::_print(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    use x86_64::instructions::interrupts;

    interrupts::without_interrupts(|| {
        CONSOLE.lock().write_fmt(args).unwrap();
    });
}

#[test_case]
fn test_initialize_blanks_every_cell() {
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    console.write_cell(b'x', ColorCode::new(Color::Red, Color::Blue), 3, 7);
    console.set_colors(Color::White, Color::Green);
    console.put_char(b'q');

    console.initialize();

    assert_eq!(console.cursor(), (0, 0));
    assert_eq!(console.color(), DEFAULT_COLOR);
    for y in 0..BUFFER_HEIGHT {
        for x in 0..BUFFER_WIDTH {
            assert_eq!(console.read_cell(x, y), ScreenChar::blank(DEFAULT_COLOR));
        }
    }
}

#[test_case]
fn test_write_cell_then_read_back() {
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    let color = ColorCode::new(Color::Yellow, Color::Magenta);
    for &(x, y) in &[(0, 0), (BUFFER_WIDTH - 1, 0), (0, BUFFER_HEIGHT - 1), (41, 12)] {
        console.write_cell(b'#', color, x, y);
        let cell = console.read_cell(x, y);
        assert_eq!(cell.ascii_character, b'#');
        assert_eq!(cell.color_code, color);
    }
}

#[test_case]
fn test_color_code_packs_nibbles() {
    let color = ColorCode::new(Color::Yellow, Color::Blue);
    assert_eq!(color.attribute(), 0x1e);
    assert_eq!(core::mem::size_of::<ScreenChar>(), 2);
}

#[test_case]
fn test_set_color_does_not_repaint() {
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    console.put_char(b'a');
    console.set_colors(Color::LightRed, Color::Black);
    console.put_char(b'b');

    assert_eq!(console.read_cell(0, 0).color_code, DEFAULT_COLOR);
    assert_eq!(
        console.read_cell(1, 0).color_code,
        ColorCode::new(Color::LightRed, Color::Black)
    );
}

#[test_case]
fn test_clear_screen_uses_current_color() {
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    console.write(b"some text\nmore text");
    let color = ColorCode::new(Color::White, Color::Blue);
    console.set_color(color);

    console.clear_screen();

    assert_eq!(console.cursor(), (0, 0));
    for y in 0..BUFFER_HEIGHT {
        for x in 0..BUFFER_WIDTH {
            assert_eq!(console.read_cell(x, y), ScreenChar::blank(color));
        }
    }
}

#[test_case]
fn test_scroll_up_shifts_rows() {
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    for y in 0..BUFFER_HEIGHT {
        for x in 0..BUFFER_WIDTH {
            console.write_cell(b'A' + (y % 26) as u8, DEFAULT_COLOR, x, y);
        }
    }

    console.scroll_up();

    for y in 0..BUFFER_HEIGHT - 1 {
        for x in 0..BUFFER_WIDTH {
            assert_eq!(console.read_cell(x, y).ascii_character, b'A' + ((y + 1) % 26) as u8);
        }
    }
}

#[test_case]
fn test_cursor_after_short_string() {
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    console.write_string("hello");
    assert_eq!(console.cursor(), (0, 5));
}

#[test_case]
fn test_full_row_wraps_cursor() {
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    console.write(&[b'x'; BUFFER_WIDTH]);
    assert_eq!(console.cursor(), (1, 0));
    assert_eq!(console.read_cell(BUFFER_WIDTH - 1, 0).ascii_character, b'x');
}

#[test_case]
fn test_last_row_scrolls_and_is_cleared() {
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    for _ in 0..BUFFER_HEIGHT - 1 {
        console.write(b"line\n");
    }
    assert_eq!(console.cursor(), (BUFFER_HEIGHT - 1, 0));
    console.write_cell(b'!', DEFAULT_COLOR, 0, BUFFER_HEIGHT - 1);

    console.put_char(b'z');

    assert_eq!(console.cursor(), (BUFFER_HEIGHT - 2, 1));
    assert_eq!(console.read_cell(0, BUFFER_HEIGHT - 2).ascii_character, b'z');
    assert_eq!(console.read_cell(0, BUFFER_HEIGHT - 3).ascii_character, b'l');
    for x in 0..BUFFER_WIDTH {
        assert_eq!(console.read_cell(x, BUFFER_HEIGHT - 1), ScreenChar::blank(DEFAULT_COLOR));
    }
}

#[test_case]
fn test_backspace_stops_at_origin() {
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    console.write(b"ab");
    console.backspace();
    assert_eq!(console.cursor(), (0, 1));
    assert_eq!(console.read_cell(1, 0).ascii_character, b' ');
    console.backspace();
    console.backspace();
    assert_eq!(console.cursor(), (0, 0));
    assert_eq!(console.read_cell(0, 0).ascii_character, b' ');
}

#[test_case]
fn test_backspace_returns_to_previous_row() {
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    console.write(&[b'y'; BUFFER_WIDTH]);
    console.backspace();
    assert_eq!(console.cursor(), (0, BUFFER_WIDTH - 1));
    assert_eq!(console.read_cell(BUFFER_WIDTH - 1, 0).ascii_character, b' ');
}

#[test_case]
fn test_write_text_stops_at_terminator() {
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    console.write_text(b"hi\r\0\0junk");
    assert_eq!(console.cursor(), (0, 2));
}

#[test_case]
fn test_println_many() {
    for _ in 0..200 {
        println!("test_println_many output");
    }
}

#[test_case]
fn test_println_output() {
    use core::fmt::Write;
    use x86_64::instructions::interrupts;

    let s = "Some test string that fits on a single line";
    interrupts::without_interrupts(|| {
        let mut console = CONSOLE.lock();
        console.clear_screen();
        writeln!(console, "{}", s).expect("writeln failed");
        for (i, c) in s.chars().enumerate() {
            let screen_char = console.read_cell(i, 0);
            assert_eq!(char::from(screen_char.ascii_character), c);
        }
        assert_eq!(console.cursor(), (1, 0));
    });
}
