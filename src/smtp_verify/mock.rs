//! Loopback SMTP server used by the probing tests.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use native_tls::{Identity, TlsAcceptor};

pub(crate) type Script = Vec<(&'static str, &'static str)>;

const CERT_PEM: &[u8] = include_bytes!("testdata/mock_cert.pem");
const KEY_PEM: &[u8] = include_bytes!("testdata/mock_key.pem");

pub(crate) struct MockServer {
    port: u16,
    handle: thread::JoinHandle<()>,
}

impl MockServer {
    /// Serves one connection per script, in order. Each script is a list of
    /// (expected command prefix, raw reply) pairs sent after the 220 banner.
    pub(crate) fn start(sessions: Vec<Script>) -> Self {
        Self::spawn(move |listener| {
            for script in sessions {
                let (stream, _) = listener.accept().expect("accept");
                greet_and_run(stream, script).expect("mock session");
            }
        })
    }

    /// One connection that offers STARTTLS with a self-signed certificate,
    /// then plays `after_tls` over the encrypted stream. A client that aborts
    /// the handshake simply ends the session.
    pub(crate) fn start_tls(after_tls: Script) -> Self {
        Self::spawn(move |listener| {
            let (stream, _) = listener.accept().expect("accept");
            let identity = Identity::from_pkcs8(CERT_PEM, KEY_PEM).expect("identity");
            let acceptor = TlsAcceptor::new(identity).expect("acceptor");
            let plain = vec![
                ("EHLO", "250-mock.smtp.test\r\n250 STARTTLS\r\n"),
                ("STARTTLS", "220 ready for TLS\r\n"),
            ];
            greet_and_run(stream.try_clone().expect("clone"), plain).expect("plain part");
            if let Ok(tls) = acceptor.accept(stream) {
                run_script(tls, after_tls).expect("tls part");
            }
        })
    }

    fn spawn<F>(serve: F) -> Self
    where
        F: FnOnce(TcpListener) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("addr").port();
        let (ready_tx, ready_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            ready_tx.send(()).ok();
            serve(listener);
        });
        ready_rx.recv().expect("server ready");
        Self { port, handle }
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn join(self) {
        self.handle.join().expect("server thread");
    }
}

/// A loopback port with nothing listening on it.
pub(crate) fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("addr").port()
}

fn greet_and_run(mut stream: TcpStream, script: Script) -> io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    stream.write_all(b"220 mock.smtp.test ESMTP\r\n")?;
    stream.flush()?;
    run_script(stream, script)
}

fn run_script<S: Read + Write>(stream: S, script: Script) -> io::Result<()> {
    let mut conn = BufReader::new(stream);
    for (expected, response) in script {
        let mut line = String::new();
        conn.read_line(&mut line)?;
        assert!(
            line.starts_with(expected),
            "expected command starting with '{expected}', got '{line}'"
        );
        conn.get_mut().write_all(response.as_bytes())?;
        conn.get_mut().flush()?;
    }
    Ok(())
}
