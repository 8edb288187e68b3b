use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use native_tls::{HandshakeError, TlsConnector, TlsStream};
use tracing::trace;

use crate::smtp_verify::error::SmtpVerifyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Splits `"250-text"` into `(250, more_follows, "text")`.
fn parse_reply_line(line: &str) -> Result<(u16, bool, &str), SmtpVerifyError> {
    let code = line
        .get(..3)
        .filter(|c| c.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|c| c.parse::<u16>().ok())
        .ok_or_else(|| SmtpVerifyError::Protocol(format!("no reply code in {line:?}")))?;
    match line.as_bytes().get(3) {
        None => Ok((code, false, "")),
        Some(b' ') => Ok((code, false, &line[4..])),
        Some(b'-') => Ok((code, true, &line[4..])),
        Some(_) => Err(SmtpVerifyError::Protocol(format!(
            "bad separator in {line:?}"
        ))),
    }
}

enum Transport {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
    Closed,
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "SMTP transport closed")
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(s) => s.read(buf),
            Self::Tls(s) => s.read(buf),
            Self::Closed => Err(closed()),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(s) => s.write(buf),
            Self::Tls(s) => s.write(buf),
            Self::Closed => Err(closed()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(s) => s.flush(),
            Self::Tls(s) => s.flush(),
            Self::Closed => Err(closed()),
        }
    }
}

fn open_socket(addr: &SocketAddr, host: &str, timeout: Duration) -> Result<TcpStream, SmtpVerifyError> {
    let socket = TcpStream::connect_timeout(addr, timeout).map_err(|source| {
        SmtpVerifyError::Connect {
            host: host.to_string(),
            source,
        }
    })?;
    socket.set_read_timeout(Some(timeout))?;
    socket.set_write_timeout(Some(timeout))?;
    Ok(socket)
}

pub struct SmtpSession {
    host: String,
    port: u16,
    conn: BufReader<Transport>,
}

impl SmtpSession {
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, SmtpVerifyError> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|source| SmtpVerifyError::Connect {
                host: host.to_string(),
                source,
            })?;

        let mut failure = SmtpVerifyError::NoAddress {
            host: host.to_string(),
            port,
        };
        for addr in addrs {
            match open_socket(&addr, host, timeout) {
                Ok(socket) => {
                    return Ok(Self {
                        host: host.to_string(),
                        port,
                        conn: BufReader::new(Transport::Plain(socket)),
                    });
                }
                Err(err) => failure = err,
            }
        }
        Err(failure)
    }

    fn read_reply(&mut self) -> Result<SmtpReply, SmtpVerifyError> {
        let mut reply = SmtpReply {
            code: 0,
            lines: Vec::new(),
        };
        let mut line = String::new();
        loop {
            line.clear();
            if self.conn.read_line(&mut line)? == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "server hung up").into());
            }
            let trimmed = line.trim_end_matches(['\r', '\n']);
            trace!(host = %self.host, port = self.port, "S: {trimmed}");

            let (code, more, text) = parse_reply_line(trimmed)?;
            if reply.lines.is_empty() {
                reply.code = code;
            } else if reply.code != code {
                return Err(SmtpVerifyError::Protocol(format!(
                    "reply code changed from {} to {code} mid-reply",
                    reply.code
                )));
            }
            reply.lines.push(text.to_string());
            if !more {
                return Ok(reply);
            }
        }
    }

    fn write_line(&mut self, command: &str) -> Result<(), SmtpVerifyError> {
        trace!(host = %self.host, port = self.port, "C: {command}");
        let out = self.conn.get_mut();
        out.write_all(command.as_bytes())?;
        out.write_all(b"\r\n")?;
        out.flush()?;
        Ok(())
    }

    pub fn read_banner(&mut self) -> Result<SmtpReply, SmtpVerifyError> {
        let reply = self.read_reply()?;
        if !reply.is_positive_completion() {
            return Err(SmtpVerifyError::Protocol(format!(
                "{} greeted with {}",
                self.host, reply.code
            )));
        }
        Ok(reply)
    }

    pub fn send_command(&mut self, command: &str) -> Result<SmtpReply, SmtpVerifyError> {
        self.write_line(command)?;
        self.read_reply()
    }

    pub fn ehlo(&mut self, helo_host: &str) -> Result<SmtpReply, SmtpVerifyError> {
        self.send_command(&format!("EHLO {helo_host}"))
    }

    /// Bytes buffered before the handshake are dropped with the old reader.
    pub fn starttls(&mut self, connector: &TlsConnector) -> Result<(), SmtpVerifyError> {
        let reply = self.send_command("STARTTLS")?;
        if !reply.is_positive_completion() {
            return Err(SmtpVerifyError::StartTlsRejected {
                host: self.host.clone(),
                code: reply.code,
            });
        }

        let Transport::Plain(socket) = std::mem::replace(self.conn.get_mut(), Transport::Closed)
        else {
            return Err(SmtpVerifyError::Protocol("TLS already negotiated".into()));
        };
        let tls = connector.connect(&self.host, socket).map_err(|err| match err {
            HandshakeError::Failure(source) => SmtpVerifyError::Tls(source),
            // blocking socket with a deadline: WouldBlock means the deadline passed
            HandshakeError::WouldBlock(_) => SmtpVerifyError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "TLS handshake timed out",
            )),
        })?;
        self.conn = BufReader::new(Transport::Tls(Box::new(tls)));
        Ok(())
    }

    pub fn verify(&mut self, address: &str) -> Result<SmtpReply, SmtpVerifyError> {
        self.send_command(&format!("VRFY {address}"))
    }

    pub fn quit(&mut self) -> Result<(), SmtpVerifyError> {
        self.write_line("QUIT")?;
        let _ = self.read_reply();
        Ok(())
    }
}
