/*!
fileio.rs - Block-oriented file-I/O port (spec.md §4.4).

A command-register state machine over a bounded filename buffer: the
host writes the target filename one character at a time through
NAMECHAR, then dispatches OPEN_READ/OPEN_WRITE/READ/WRITE/CLOSE through
the STATUS/COMMAND register at offset 0. File handles are opened
against the host filesystem via `std::fs`; any new open (or a reset)
closes whatever was previously open, per spec.md §3's port lifecycle.
*/

use std::fs::File;
use std::io::{Read, Write};

use crate::devices::Device;

const STATUS_COMMAND: u16 = 0x0;
const DATA: u16 = 0x1;
const NAMEINDEX: u16 = 0x2;
const NAMECHAR: u16 = 0x3;

const CMD_RESET: u8 = 0x00;
const CMD_OPEN_READ: u8 = 0x01;
const CMD_OPEN_WRITE: u8 = 0x02;
const CMD_READ: u8 = 0x03;
const CMD_WRITE: u8 = 0x04;
const CMD_CLOSE: u8 = 0x05;

const STATUS_OPEN: u8 = 0x01;
const STATUS_EOF: u8 = 0x02;
const STATUS_ERROR: u8 = 0x04;
const STATUS_READY: u8 = 0x80;

/// Bound on the filename buffer; writes to NAMECHAR past this index are
/// silently dropped rather than growing the buffer (spec.md does not
/// define overflow behavior, so this core treats it as a no-op, the
/// least surprising reading of "bounded").
const NAME_BUFFER_LEN: usize = 256;

enum OpenFile {
    None,
    Reading(File),
    Writing(File),
}

pub struct FileIoPort {
    file: OpenFile,
    status: u8,
    data: u8,
    name_index: usize,
    name_buffer: [u8; NAME_BUFFER_LEN],
}

impl FileIoPort {
    pub fn new() -> Self {
        Self {
            file: OpenFile::None,
            status: STATUS_READY,
            data: 0,
            name_index: 0,
            name_buffer: [0; NAME_BUFFER_LEN],
        }
    }

    fn close_file(&mut self) {
        self.file = OpenFile::None;
    }

    fn filename(&self) -> String {
        let end = self
            .name_buffer
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.name_buffer.len());
        String::from_utf8_lossy(&self.name_buffer[..end]).into_owned()
    }

    fn dispatch(&mut self, cmd: u8) {
        match cmd {
            CMD_RESET => {
                self.close_file();
                self.status = STATUS_READY;
                self.name_buffer = [0; NAME_BUFFER_LEN];
                self.name_index = 0;
            }
            CMD_OPEN_READ => {
                self.close_file();
                if self.name_index < NAME_BUFFER_LEN {
                    self.name_buffer[self.name_index] = 0;
                }
                match File::open(self.filename()) {
                    Ok(f) => {
                        self.file = OpenFile::Reading(f);
                        self.status = STATUS_READY | STATUS_OPEN;
                    }
                    Err(_) => {
                        self.status = STATUS_READY | STATUS_ERROR;
                    }
                }
            }
            CMD_OPEN_WRITE => {
                self.close_file();
                if self.name_index < NAME_BUFFER_LEN {
                    self.name_buffer[self.name_index] = 0;
                }
                match File::create(self.filename()) {
                    Ok(f) => {
                        self.file = OpenFile::Writing(f);
                        self.status = STATUS_READY | STATUS_OPEN;
                    }
                    Err(_) => {
                        self.status = STATUS_READY | STATUS_ERROR;
                    }
                }
            }
            CMD_READ => match &mut self.file {
                OpenFile::Reading(f) => {
                    let mut byte = [0u8; 1];
                    match f.read(&mut byte) {
                        Ok(1) => {
                            self.data = byte[0];
                            self.status &= !STATUS_EOF;
                        }
                        _ => {
                            self.data = 0;
                            self.status |= STATUS_EOF;
                        }
                    }
                }
                _ => self.status |= STATUS_ERROR,
            },
            CMD_WRITE => match &mut self.file {
                OpenFile::Writing(f) => {
                    let _ = f.write_all(&[self.data]);
                }
                _ => self.status |= STATUS_ERROR,
            },
            CMD_CLOSE => {
                self.close_file();
                self.status = STATUS_READY;
            }
            _ => {}
        }
    }
}

impl Default for FileIoPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for FileIoPort {
    fn read(&mut self, offset: u16) -> u8 {
        match offset & 0x3 {
            STATUS_COMMAND => self.status,
            DATA => self.data,
            NAMEINDEX => self.name_index as u8,
            NAMECHAR => {
                if self.name_index < NAME_BUFFER_LEN {
                    self.name_buffer[self.name_index]
                } else {
                    0xFF
                }
            }
            _ => 0xFF,
        }
    }

    fn write(&mut self, offset: u16, value: u8) {
        match offset & 0x3 {
            STATUS_COMMAND => self.dispatch(value),
            DATA => self.data = value,
            NAMEINDEX => self.name_index = value as usize,
            NAMECHAR => {
                if self.name_index < NAME_BUFFER_LEN {
                    self.name_buffer[self.name_index] = value;
                    // Clamp rather than let the index register overflow
                    // past the last valid slot (it must stay a valid
                    // `u8`-representable offset for NAMEINDEX reads).
                    self.name_index = (self.name_index + 1).min(NAME_BUFFER_LEN - 1);
                }
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.dispatch(CMD_RESET);
    }
}
