//! Passive-mode FTP transport
//!
//! Implements just the commands the mailbox needs: `USER`/`PASS`, `TYPE I`,
//! `PASV`, `STOR`, `RETR`, `MDTM`, `DELE` and `QUIT`. Data connections are
//! opened to the control connection's peer address; the host part of the
//! `227` reply is ignored, which keeps NATed servers working.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, trace};

use crate::config::DEFAULT_TIMEOUT_MS;
use crate::error::MailboxError;
use crate::mdtm::parse_mdtm;
use crate::transport::{MailboxSession, MailboxTransport};

// Reply codes
const READY: u16 = 220;
const CLOSING: u16 = 221;
const TRANSFER_COMPLETE: u16 = 226;
const PASSIVE: u16 = 227;
const LOGGED_IN: u16 = 230;
const SUPERFLUOUS: u16 = 202;
const FILE_ACTION_OK: u16 = 250;
const FILE_STATUS: u16 = 213;
const COMMAND_OK: u16 = 200;
const NEED_PASSWORD: u16 = 331;
const DATA_ALREADY_OPEN: u16 = 125;
const OPENING_DATA: u16 = 150;
const FILE_UNAVAILABLE: u16 = 550;

/// One server reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Three-digit reply code
    pub code: u16,
    /// Reply text, lines joined with `\n`
    pub text: String,
}

impl Reply {
    fn into_error(self) -> MailboxError {
        MailboxError::Reply {
            code: self.code,
            text: self.text,
        }
    }
}

/// Read one (possibly multi-line) reply
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply, MailboxError> {
    let first = read_line(reader)?;
    let (code, sep, text) = split_reply_line(&first)?;

    if sep != '-' {
        return Ok(Reply {
            code,
            text: text.to_string(),
        });
    }

    // Multi-line: continues until a line starting with "<code> "
    let terminator = format!("{code} ");
    let mut lines = vec![text.to_string()];
    loop {
        let line = read_line(reader)?;
        if let Some(rest) = line.strip_prefix(&terminator) {
            lines.push(rest.to_string());
            break;
        }
        lines.push(line);
    }
    Ok(Reply {
        code,
        text: lines.join("\n"),
    })
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<String, MailboxError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        let closed = io::Error::new(io::ErrorKind::UnexpectedEof, "control connection closed");
        return Err(closed.into());
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).to_string();
    trace!("<- {}", trimmed);
    Ok(trimmed)
}

fn split_reply_line(line: &str) -> Result<(u16, char, &str), MailboxError> {
    let malformed = || MailboxError::Reply {
        code: 0,
        text: format!("malformed reply {line:?}"),
    };

    let digits = line.get(..3).ok_or_else(malformed)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let code = digits.parse().map_err(|_| malformed())?;
    let mut rest = line[3..].chars();
    let sep = rest.next().unwrap_or(' ');
    if sep != ' ' && sep != '-' {
        return Err(malformed());
    }
    Ok((code, sep, rest.as_str()))
}

/// Extract the data port from a `227` reply text
///
/// Accepts `Entering Passive Mode (h1,h2,h3,h4,p1,p2)`, with or without
/// the parentheses.
pub fn parse_pasv_port(text: &str) -> Result<u16, MailboxError> {
    let malformed = || MailboxError::Reply {
        code: PASSIVE,
        text: text.to_string(),
    };

    let start = text
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(malformed)?;
    let numbers: Vec<u8> = text[start..]
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .take(6)
        .map(|part| part.parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|_| malformed())?;

    match numbers.as_slice() {
        [_, _, _, _, hi, lo] => Ok(u16::from(*hi) << 8 | u16::from(*lo)),
        _ => Err(malformed()),
    }
}

fn expect(reply: Reply, codes: &[u16]) -> Result<Reply, MailboxError> {
    if codes.contains(&reply.code) {
        Ok(reply)
    } else {
        Err(reply.into_error())
    }
}

fn expect_file(reply: Reply, name: &str, codes: &[u16]) -> Result<Reply, MailboxError> {
    if reply.code == FILE_UNAVAILABLE {
        return Err(MailboxError::NotFound(name.to_string()));
    }
    expect(reply, codes)
}

/// FTP account used as the mailbox
#[derive(Clone)]
pub struct FtpTransport {
    host: String,
    port: u16,
    username: String,
    password: String,
    timeout: Duration,
}

impl FtpTransport {
    /// Create a transport for the given account
    pub fn new(host: String, port: u16, username: String, password: String) -> Self {
        Self {
            host,
            port,
            username,
            password,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Set the connect/read/write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn connect(&self) -> Result<TcpStream, MailboxError> {
        let connect_err = |source| MailboxError::Connect {
            host: self.host.clone(),
            source,
        };

        let addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(connect_err)?;
        let mut last = io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses");
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => return Ok(stream),
                Err(err) => last = err,
            }
        }
        Err(connect_err(last))
    }
}

impl MailboxTransport for FtpTransport {
    type Session = FtpSession;

    fn login(&self) -> Result<FtpSession, MailboxError> {
        let stream = self.connect()?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        let peer = stream.peer_addr()?.ip();

        let mut session = FtpSession {
            reader: BufReader::new(stream.try_clone()?),
            writer: stream,
            peer,
            timeout: self.timeout,
        };

        expect(session.reply()?, &[READY])?;
        let user = session.command(&format!("USER {}", self.username))?;
        match user.code {
            LOGGED_IN => {}
            NEED_PASSWORD => {
                let pass = session.send(&format!("PASS {}", self.password), "PASS ****")?;
                expect(pass, &[LOGGED_IN, SUPERFLUOUS])?;
            }
            _ => return Err(user.into_error()),
        }
        expect(session.command("TYPE I")?, &[COMMAND_OK])?;

        debug!("logged in to {} as {}", self.host, self.username);
        Ok(session)
    }
}

/// Authenticated FTP control connection
pub struct FtpSession {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    peer: IpAddr,
    timeout: Duration,
}

impl FtpSession {
    fn reply(&mut self) -> Result<Reply, MailboxError> {
        read_reply(&mut self.reader)
    }

    fn command(&mut self, line: &str) -> Result<Reply, MailboxError> {
        self.send(line, line)
    }

    /// Send `line`, logging `shown` in its place
    fn send(&mut self, line: &str, shown: &str) -> Result<Reply, MailboxError> {
        trace!("-> {}", shown);
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\r\n")?;
        self.writer.flush()?;
        self.reply()
    }

    fn open_data(&mut self) -> Result<TcpStream, MailboxError> {
        let reply = expect(self.command("PASV")?, &[PASSIVE])?;
        let port = parse_pasv_port(&reply.text)?;
        let stream = TcpStream::connect_timeout(&SocketAddr::new(self.peer, port), self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        Ok(stream)
    }
}

impl MailboxSession for FtpSession {
    fn stat_modified_time(&mut self, name: &str) -> Result<f64, MailboxError> {
        let reply = self.command(&format!("MDTM {name}"))?;
        let reply = expect_file(reply, name, &[FILE_STATUS])?;
        parse_mdtm(&reply.text)
    }

    fn put(&mut self, name: &str, bytes: &[u8]) -> Result<(), MailboxError> {
        let mut data = self.open_data()?;
        expect(
            self.command(&format!("STOR {name}"))?,
            &[DATA_ALREADY_OPEN, OPENING_DATA],
        )?;
        data.write_all(bytes)?;
        data.flush()?;
        data.shutdown(Shutdown::Write)?;
        drop(data);
        expect(self.reply()?, &[TRANSFER_COMPLETE, FILE_ACTION_OK])?;
        Ok(())
    }

    fn get(&mut self, name: &str) -> Result<Vec<u8>, MailboxError> {
        let mut data = self.open_data()?;
        let reply = self.command(&format!("RETR {name}"))?;
        expect_file(reply, name, &[DATA_ALREADY_OPEN, OPENING_DATA])?;
        let mut bytes = Vec::new();
        data.read_to_end(&mut bytes)?;
        drop(data);
        expect(self.reply()?, &[TRANSFER_COMPLETE, FILE_ACTION_OK])?;
        Ok(bytes)
    }

    fn delete(&mut self, name: &str) -> Result<(), MailboxError> {
        let reply = self.command(&format!("DELE {name}"))?;
        expect_file(reply, name, &[FILE_ACTION_OK])?;
        Ok(())
    }

    fn close(mut self) -> Result<(), MailboxError> {
        expect(self.command("QUIT")?, &[CLOSING])?;
        Ok(())
    }
}
