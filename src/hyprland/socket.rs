//! Hyprland's request socket.
//!
//! Hyprland answers one request per connection on
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`:
//! `j/<query>` returns JSON, `/dispatch <args>` returns `ok` or an error
//! message.  [`HyprlandIpc`] is that exchange; [`CommandSocket`] is the real
//! socket behind it.

use log::debug;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a single request may block on the socket.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors from talking to Hyprland.
#[derive(Debug, thiserror::Error)]
pub enum HyprlandIpcError {
    #[error("{0} is not set, is Hyprland running?")]
    MissingEnv(&'static str),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dispatch {request:?} refused: {response}")]
    Refused { request: String, response: String },
    #[error("unexpected reply: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One request, one reply.
///
/// Shared between the host's parallel writers and the watcher thread.
pub trait HyprlandIpc: Send + Sync {
    /// Send `request` verbatim and return Hyprland's reply.
    fn request(&self, request: &str) -> Result<String, HyprlandIpcError>;

    /// Run a `j/` query and decode the reply.
    fn query<T: DeserializeOwned>(&self, query: &str) -> Result<T, HyprlandIpcError> {
        let reply = self.request(&format!("j/{}", query))?;
        Ok(serde_json::from_str(&reply)?)
    }

    /// Run a dispatcher; anything but `ok` is an error.
    fn dispatch(&self, args: &str) -> Result<(), HyprlandIpcError> {
        debug!("dispatch {}", args);
        let reply = self.request(&format!("/dispatch {}", args))?;
        match reply.trim() {
            "ok" => Ok(()),
            other => Err(HyprlandIpcError::Refused {
                request: args.to_string(),
                response: other.to_string(),
            }),
        }
    }
}

/// The running Hyprland instance's request socket.
#[derive(Debug, Clone)]
pub struct CommandSocket {
    path: PathBuf,
}

impl CommandSocket {
    /// Locate the socket of the instance this process was started under.
    pub fn from_env() -> Result<Self, HyprlandIpcError> {
        let runtime = std::env::var_os("XDG_RUNTIME_DIR").ok_or(HyprlandIpcError::MissingEnv("XDG_RUNTIME_DIR"))?;
        let instance = std::env::var_os("HYPRLAND_INSTANCE_SIGNATURE")
            .ok_or(HyprlandIpcError::MissingEnv("HYPRLAND_INSTANCE_SIGNATURE"))?;
        Ok(Self::at(
            PathBuf::from(runtime).join("hypr").join(instance).join(".socket.sock"),
        ))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn exchange(&self, request: &str) -> std::io::Result<String> {
        let mut stream = UnixStream::connect(&self.path)?;
        stream.set_read_timeout(Some(REQUEST_TIMEOUT))?;
        stream.set_write_timeout(Some(REQUEST_TIMEOUT))?;
        stream.write_all(request.as_bytes())?;
        let mut reply = String::new();
        stream.read_to_string(&mut reply)?;
        Ok(reply)
    }
}

impl HyprlandIpc for CommandSocket {
    fn request(&self, request: &str) -> Result<String, HyprlandIpcError> {
        self.exchange(request).map_err(|source| HyprlandIpcError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use std::os::unix::net::UnixListener;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("hyprattach-hypr-{}-{}.sock", std::process::id(), id))
    }

    /// Serve `replies` one connection at a time, returning the requests seen.
    fn serve(path: &Path, replies: Vec<&'static str>) -> std::thread::JoinHandle<Vec<String>> {
        let listener = UnixListener::bind(path).unwrap();
        std::thread::spawn(move || {
            let mut seen = Vec::new();
            for reply in replies {
                let (mut stream, _) = listener.accept().unwrap();
                let mut request = String::new();
                // Requests carry no terminator; take whatever the first read returns.
                let mut reader = std::io::BufReader::new(stream.try_clone().unwrap());
                request.push_str(std::str::from_utf8(reader.fill_buf().unwrap()).unwrap());
                seen.push(request);
                stream.write_all(reply.as_bytes()).unwrap();
            }
            seen
        })
    }

    #[derive(serde::Deserialize)]
    struct Workspace {
        id: i64,
    }

    #[test]
    fn query_and_dispatch_over_socket() {
        let path = tmp_socket_path();
        let server = serve(&path, vec![r#"{"id": 4, "name": "4"}"#, "ok", "Invalid dispatcher"]);
        let socket = CommandSocket::at(&path);

        let ws: Workspace = socket.query("activeworkspace").unwrap();
        assert_eq!(ws.id, 4);
        socket.dispatch("closewindow address:0x1").unwrap();
        match socket.dispatch("nonsense") {
            Err(HyprlandIpcError::Refused { request, response }) => {
                assert_eq!(request, "nonsense");
                assert_eq!(response, "Invalid dispatcher");
            }
            other => panic!("expected Refused, got {other:?}"),
        }

        assert_eq!(
            server.join().unwrap(),
            vec!["j/activeworkspace", "/dispatch closewindow address:0x1", "/dispatch nonsense"]
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_socket_is_an_io_error() {
        let socket = CommandSocket::at(tmp_socket_path());
        let err = socket.request("j/clients").unwrap_err();
        assert!(matches!(err, HyprlandIpcError::Io { .. }), "{err}");
    }
}
