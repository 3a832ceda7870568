/* The read-eval loop: prompt, read a line, classify it against the fixed vocabulary, run the handler.
Handlers live in `commands`. */

pub mod commands;

use crate::keyboard::CharSource;
use crate::line_editor::read_line;
use crate::serial_println;
use crate::vga_buffer::Console;
use commands::Command;

pub const PROMPT: &str = "root@DaggerOS> ";

/// Bytes available for a command line, terminator included.
pub const COMMAND_CAPACITY: usize = 10;

pub struct Shell<S> {
    input: S,
}

impl<S: CharSource> Shell<S> {
    pub fn new(input: S) -> Shell<S> {
        Shell { input }
    }

    pub fn input(&self) -> &S {
        &self.input
    }

    pub fn prompt(&self, console: &mut Console) {
        console.write_string(PROMPT);
    }

    /// Reads one command line and classifies it. The cursor ends up on the next line.
    pub fn read_command(&mut self, console: &mut Console) -> Command {
        let mut line = [0u8; COMMAND_CAPACITY];
        read_line(console, &mut self.input, &mut line);
        let command = Command::classify(&line);
        line.fill(0);
        console.put_char(b'\n');
        command
    }

    pub fn execute(&mut self, command: Command, console: &mut Console) {
        serial_println!("[shell] dispatch {:?}", command);
        match command {
            Command::Help => commands::help(console),
            Command::Shutdown => {
                commands::shutdown_screen(console);
                crate::power_off();
            }
            Command::Echo => commands::echo(console, &mut self.input),
            Command::Clear => console.clear_screen(),
            Command::Unknown => commands::not_found(console),
        }
    }

    /// One full round: prompt, read, dispatch.
    pub fn step(&mut self, console: &mut Console) -> Command {
        self.prompt(console);
        let command = self.read_command(console);
        self.execute(command, console);
        command
    }

    /// Runs until `shutdown` powers the machine off.
    pub fn run(&mut self, console: &mut Console) -> ! {
        loop {
            self.step(console);
        }
    }
}

#[cfg(test)]
use crate::keyboard::{InputReader, ScriptedController};
#[cfg(test)]
use crate::vga_buffer::{Buffer, BUFFER_WIDTH};

#[cfg(test)]
fn row_starts_with(console: &Console, row: usize, text: &[u8]) -> bool {
    text.iter()
        .enumerate()
        .all(|(x, &b)| console.read_cell(x, row).ascii_character == b)
}

#[test_case]
fn test_help_session() {
    // h e l p <enter>, each followed by its release code
    let keys: [u8; 10] = [0x23, 0xa3, 0x12, 0x92, 0x26, 0xa6, 0x19, 0x99, 0x1c, 0x9c];
    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    let mut shell = Shell::new(InputReader::new(ScriptedController::new(&keys)));

    let command = shell.step(&mut console);

    assert_eq!(command, Command::Help);
    assert!(row_starts_with(&console, 0, b"root@DaggerOS> help"));
    assert!(row_starts_with(&console, 1, b"---- HELP MENU ----"));
    assert!(row_starts_with(&console, 2, b"Commands:"));
    assert!(row_starts_with(&console, 7, b"Warning: special keys"));
    assert_eq!(console.cursor(), (8, 0));
}

#[test_case]
fn test_unknown_command_session() {
    // h e l p x <enter>
    let keys: [u8; 6] = [0x23, 0x12, 0x26, 0x19, 0x2d, 0x1c];
    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    let mut shell = Shell::new(InputReader::new(ScriptedController::new(&keys)));

    assert_eq!(shell.step(&mut console), Command::Unknown);
    assert!(row_starts_with(&console, 1, b"[!]nsh: Command not found"));
}

#[test_case]
fn test_clear_session() {
    // c l e a r <enter>
    let keys: [u8; 6] = [0x2e, 0x26, 0x12, 0x1e, 0x13, 0x1c];
    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    console.write_string("leftover output\n");
    let mut shell = Shell::new(InputReader::new(ScriptedController::new(&keys)));

    assert_eq!(shell.step(&mut console), Command::Clear);
    assert_eq!(console.cursor(), (0, 0));
    for x in 0..BUFFER_WIDTH {
        assert_eq!(console.read_cell(x, 0).ascii_character, b' ');
        assert_eq!(console.read_cell(x, 1).ascii_character, b' ');
    }
}

#[test_case]
fn test_echo_session() {
    // e c h o <enter>, then h i <space> x <backspace> y o u <enter>
    let keys: [u8; 14] = [
        0x12, 0x2e, 0x23, 0x18, 0x1c, 0x23, 0x17, 0x39, 0x2d, 0x0e, 0x15, 0x18, 0x16, 0x1c,
    ];
    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    let mut shell = Shell::new(InputReader::new(ScriptedController::new(&keys)));

    assert_eq!(shell.step(&mut console), Command::Echo);
    assert!(row_starts_with(&console, 1, b"Enter string: hi you"));
    assert!(row_starts_with(&console, 2, b"hi you"));
    assert_eq!(console.read_cell(6, 2).ascii_character, b' ');
    assert_eq!(console.cursor(), (3, 0));
    assert_eq!(shell.input().controller().remaining(), 0);
}

#[test_case]
fn test_overlong_command_is_cut_at_capacity() {
    // "shutdownxy" fills the nine usable slots with "shutdownx"; the rest stays unread
    let keys: [u8; 11] = [0x1f, 0x23, 0x16, 0x14, 0x20, 0x18, 0x11, 0x31, 0x2d, 0x15, 0x1c];
    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    let mut shell = Shell::new(InputReader::new(ScriptedController::new(&keys)));

    assert_eq!(shell.read_command(&mut console), Command::Unknown);
    assert_eq!(shell.input().controller().remaining(), 2);
}
