use crate::keyboard::CharSource;
use crate::line_editor::{line_text, read_line};
use crate::vga_buffer::{Color, Console};

/// Bytes available for a line typed at the `echo` prompt, terminator included.
pub const ECHO_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Shutdown,
    Echo,
    Clear,
    Unknown,
}

/* Checked in this order; the first exact match wins. */
const VOCABULARY: [(&[u8], Command); 4] = [
    (b"help\r", Command::Help),
    (b"shutdown\r", Command::Shutdown),
    (b"echo\r", Command::Echo),
    (b"clear\r", Command::Clear),
];

impl Command {
    /// Classifies a terminated line. Matching is exact and case-sensitive: `"helpx"` or `"Help"`
    /// are unknown commands.
    pub fn classify(line: &[u8]) -> Command {
        let typed = line_text(line);
        VOCABULARY
            .iter()
            .find(|(word, _)| line_text(word) == typed)
            .map(|&(_, command)| command)
            .unwrap_or(Command::Unknown)
    }
}

pub fn help(console: &mut Console) {
    console.write_string("---- HELP MENU ----\n");
    console.write_string("Commands:\n");
    console.write_string("  help -------> this menu\n");
    console.write_string("  shutdown ---> power off machine\n");
    console.write_string("  echo -------> type and receive a response\n");
    console.write_string("  clear ------> clear screen\n");
    console.write_string("Warning: special keys (esc, ctrl, ...) will not work.\n");
}

pub fn echo<S: CharSource>(console: &mut Console, input: &mut S) {
    let mut line = [0u8; ECHO_CAPACITY];
    console.write_string("Enter string: ");
    read_line(console, input, &mut line);
    console.put_char(b'\n');
    console.write_text(&line);
    console.put_char(b'\n');
}

/// Everything `shutdown` does before cutting the power.
pub fn shutdown_screen(console: &mut Console) {
    console.clear_screen();
    console.write_string("Shutting down...");
}

pub fn not_found(console: &mut Console) {
    console.write_string("[!]nsh: Command not found\n");
}

/// One-time greeting shown before the first prompt.
pub fn hello_user(console: &mut Console, user: &str) {
    console.set_colors(Color::Blue, Color::Black);
    console.write_string("                          --- Welcome to DaggerOS ---\n");
    console.write_string("                                   Hello, ");
    console.write_string(user);
    console.write_string("\n");
    console.set_colors(Color::LightGray, Color::Black);
}

#[test_case]
fn test_classify_vocabulary() {
    assert_eq!(Command::classify(b"help\r\0\0\0\0\0"), Command::Help);
    assert_eq!(Command::classify(b"shutdown\r\0"), Command::Shutdown);
    assert_eq!(Command::classify(b"echo\r"), Command::Echo);
    assert_eq!(Command::classify(b"clear\r\0\0\0\0"), Command::Clear);
}

#[test_case]
fn test_classify_is_length_sensitive() {
    assert_eq!(Command::classify(b"helpx\r"), Command::Unknown);
    assert_eq!(Command::classify(b"hel\r"), Command::Unknown);
    assert_eq!(Command::classify(b"ech\r"), Command::Unknown);
    assert_eq!(Command::classify(b"shutdow\r\0\0"), Command::Unknown);
}

#[test_case]
fn test_classify_is_case_sensitive() {
    assert_eq!(Command::classify(b"Help\r"), Command::Unknown);
    assert_eq!(Command::classify(b"CLEAR\r"), Command::Unknown);
}

#[test_case]
fn test_classify_empty_line() {
    assert_eq!(Command::classify(b"\r\0\0"), Command::Unknown);
    assert_eq!(Command::classify(b""), Command::Unknown);
}

#[test_case]
fn test_hello_user_restores_color() {
    use crate::vga_buffer::{Buffer, ColorCode, DEFAULT_COLOR};

    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    hello_user(&mut console, "root");

    assert_eq!(console.color(), DEFAULT_COLOR);
    assert_eq!(console.cursor(), (2, 0));
    let hello = console.read_cell(35, 1);
    assert_eq!(hello.ascii_character, b'H');
    assert_eq!(hello.color_code, ColorCode::new(Color::Blue, Color::Black));
    assert_eq!(console.read_cell(42, 1).ascii_character, b'r');
}

#[test_case]
fn test_shutdown_screen_clears_first() {
    use crate::vga_buffer::Buffer;

    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    console.write_string("old output\nmore\n");
    shutdown_screen(&mut console);

    assert_eq!(console.cursor(), (0, 16));
    assert_eq!(console.read_cell(0, 0).ascii_character, b'S');
    assert_eq!(console.read_cell(0, 1).ascii_character, b' ');
}

#[test_case]
fn test_not_found_message() {
    use crate::vga_buffer::Buffer;

    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    not_found(&mut console);

    let expected = b"[!]nsh: Command not found";
    for (x, &b) in expected.iter().enumerate() {
        assert_eq!(console.read_cell(x, 0).ascii_character, b);
    }
    assert_eq!(console.cursor(), (1, 0));
}
