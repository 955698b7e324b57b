use crossbeam::channel::Sender;
use std::io::Read;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// The handheld's six keys, mapped onto the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Up,
    Down,
    Left,
    Right,
    Ok,
    Back,
}

#[derive(Debug, Clone, Copy)]
pub struct InputEvent {
    pub key: InputKey,
}

fn key_for_byte(byte: u8) -> Option<InputKey> {
    match byte {
        b'w' | b'W' => Some(InputKey::Up),
        b's' | b'S' => Some(InputKey::Down),
        b'a' | b'A' => Some(InputKey::Left),
        b'd' | b'D' => Some(InputKey::Right),
        b'm' | b'M' | b'\r' => Some(InputKey::Ok),
        b'q' | b'Q' | 0x1b => Some(InputKey::Back),
        _ => None,
    }
}

/// Reads stdin byte-wise and feeds key events into the queue. EOF maps
/// to Back so piped input terminates the session; the thread also ends
/// once the receiving side is gone.
pub fn spawn_stdin_reader(tx: Sender<InputEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stdin = std::io::stdin();
        let mut buf = [0u8; 1];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) | Err(_) => {
                    debug!("stdin closed; signalling Back");
                    let _ = tx.send(InputEvent {
                        key: InputKey::Back,
                    });
                    break;
                }
                Ok(_) => {
                    if let Some(key) = key_for_byte(buf[0]) {
                        if tx.send(InputEvent { key }).is_err() {
                            break;
                        }
                    }
                }
            }
        }
    })
}
