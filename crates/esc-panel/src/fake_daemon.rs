//! In-process stand-in for `pigpiod` used by the tests
//!
//! Answers SERVO, GETSERVO and HWVER the way the daemon does, remembers every
//! frame it saw and counts accepted connections.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use esc_core::pigpio::{FRAME_LEN, MAX_USER_GPIO};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub cmd: u32,
    pub p1: u32,
    pub p2: u32,
}

#[derive(Default)]
struct State {
    frames: Vec<Frame>,
    connections: usize,
    widths: [u32; 32],
    /// SERVO width that makes the daemon close the socket instead of replying
    hang_up_on: Option<u32>,
}

pub struct FakeDaemon {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
}

impl FakeDaemon {
    pub const REVISION: u32 = 0x00a0_2082;

    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(State::default()));

        let accept_state = state.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                accept_state.lock().unwrap().connections += 1;
                let conn_state = accept_state.clone();
                thread::spawn(move || serve(stream, conn_state));
            }
        });

        Self { addr, state }
    }

    /// An address nothing is listening on.
    pub fn unused_addr() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr.to_string()
    }

    pub fn addr(&self) -> String {
        self.addr.to_string()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.state.lock().unwrap().frames.clone()
    }

    /// SERVO widths written so far, in order
    pub fn servo_writes(&self) -> Vec<u32> {
        self.frames()
            .iter()
            .filter(|f| f.cmd == 8)
            .map(|f| f.p2)
            .collect()
    }

    /// Drop the connection, unanswered, on the next SERVO with `width`.
    pub fn hang_up_on(&self, width: u32) {
        self.state.lock().unwrap().hang_up_on = Some(width);
    }

    pub fn connections(&self) -> usize {
        self.state.lock().unwrap().connections
    }
}

fn serve(mut stream: TcpStream, state: Arc<Mutex<State>>) {
    let mut request = [0u8; FRAME_LEN];
    while stream.read_exact(&mut request).is_ok() {
        let word = |i: usize| {
            u32::from_le_bytes([request[i], request[i + 1], request[i + 2], request[i + 3]])
        };
        let frame = Frame {
            cmd: word(0),
            p1: word(4),
            p2: word(8),
        };

        let result: i32 = {
            let mut state = state.lock().unwrap();
            state.frames.push(frame);
            if frame.cmd == 8 && state.hang_up_on == Some(frame.p2) {
                state.hang_up_on = None;
                state.widths[frame.p1 as usize] = frame.p2;
                break;
            }
            match frame.cmd {
                8 if frame.p1 > MAX_USER_GPIO as u32 => -2,
                8 if frame.p2 != 0 && !(500..=2500).contains(&frame.p2) => -7,
                8 => {
                    state.widths[frame.p1 as usize] = frame.p2;
                    0
                }
                84 if frame.p1 > MAX_USER_GPIO as u32 => -2,
                84 => match state.widths[frame.p1 as usize] {
                    0 => -93,
                    width => width as i32,
                },
                17 => FakeDaemon::REVISION as i32,
                _ => -1,
            }
        };

        let mut reply = [0u8; FRAME_LEN];
        reply[0..12].copy_from_slice(&request[0..12]);
        reply[12..16].copy_from_slice(&result.to_le_bytes());
        if stream.write_all(&reply).is_err() {
            break;
        }
    }
}
