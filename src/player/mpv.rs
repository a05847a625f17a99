//! mpv media backend
//!
//! Runs mpv as the playback engine and drives it over its JSON IPC socket.
//! Observed properties are turned into [`MediaEvent`]s and cached so the
//! synchronous [`MediaSession`] getters never wait on the engine. Frame
//! captures are tagged with an IPC `request_id` and delivered as events once
//! mpv confirms the screenshot was written.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::TimeRange;
use crate::player::media::{FrameSnapshot, MediaBackend, MediaEvent, MediaSession, PlaybackError};

/// Properties observed on every session, by observer id
const OBSERVED: &[(u64, &str)] = &[
    (1, "time-pos"),
    (2, "duration"),
    (3, "pause"),
    (4, "eof-reached"),
    (5, "fullscreen"),
    (6, "demuxer-cache-state"),
];

const CONNECT_ATTEMPTS: u32 = 50;
const CONNECT_INTERVAL: Duration = Duration::from_millis(100);
const QUIT_GRACE: Duration = Duration::from_secs(2);

/// Locate the mpv binary
pub fn default_program() -> String {
    #[cfg(target_os = "macos")]
    if Path::new("/Applications/mpv.app/Contents/MacOS/mpv").exists() {
        return "/Applications/mpv.app/Contents/MacOS/mpv".to_string();
    }
    "mpv".to_string()
}

/// Check if mpv is available on the system
pub async fn is_available(program: &str) -> bool {
    if program.starts_with('/') {
        return Path::new(program).exists();
    }

    Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Opens mpv sessions
#[derive(Debug, Clone)]
pub struct MpvBackend {
    program: String,
}

impl MpvBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for MpvBackend {
    fn default() -> Self {
        Self::new(default_program())
    }
}

impl MediaBackend for MpvBackend {
    fn name(&self) -> &str {
        "mpv"
    }

    fn plays_hls_natively(&self) -> bool {
        true
    }

    fn open(&mut self, url: &str) -> Result<Box<dyn MediaSession>, PlaybackError> {
        Ok(Box::new(MpvSession::spawn(&self.program, url)?))
    }
}

/// Property cache shared with the IPC task
#[derive(Debug, Default)]
struct Props {
    time_pos: f64,
    buffered: Vec<TimeRange>,
    /// Screenshot files awaiting mpv's reply, by request id
    pending_frames: HashMap<u64, PathBuf>,
}

/// One running mpv process
pub struct MpvSession {
    child: Option<Child>,
    socket: PathBuf,
    props: Arc<Mutex<Props>>,
    commands: mpsc::UnboundedSender<Value>,
    events: mpsc::UnboundedReceiver<MediaEvent>,
    ipc: JoinHandle<()>,
}

impl MpvSession {
    /// Start mpv paused on `url` and connect to its IPC socket
    pub fn spawn(program: &str, url: &str) -> Result<Self, PlaybackError> {
        let socket = std::env::temp_dir().join(format!("reeltui-mpv-{}.sock", uuid::Uuid::new_v4()));

        let child = Command::new(program)
            .arg(url)
            .arg(format!("--input-ipc-server={}", socket.display()))
            .arg("--pause")
            .arg("--keep-open=yes")
            .arg("--force-window=immediate")
            .arg("--really-quiet")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PlaybackError::EngineNotFound(program.to_string())
                } else {
                    PlaybackError::StartFailed(e)
                }
            })?;

        let props = Arc::new(Mutex::new(Props::default()));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let ipc = tokio::spawn(run_ipc(
            socket.clone(),
            CONNECT_ATTEMPTS,
            cmd_rx,
            event_tx,
            Arc::clone(&props),
        ));

        Ok(Self {
            child: Some(child),
            socket,
            props,
            commands: cmd_tx,
            events: event_rx,
            ipc,
        })
    }

    fn command(&self, args: Value) {
        let _ = self.commands.send(json!({ "command": args }));
    }

    fn props(&self) -> std::sync::MutexGuard<'_, Props> {
        lock(&self.props)
    }
}

impl MediaSession for MpvSession {
    fn play(&mut self) {
        self.command(json!(["set_property", "pause", false]));
    }

    fn pause(&mut self) {
        self.command(json!(["set_property", "pause", true]));
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.command(json!(["seek", seconds, "absolute"]));
        self.props().time_pos = seconds;
    }

    fn current_time(&self) -> f64 {
        self.props().time_pos
    }

    fn buffered(&self) -> Vec<TimeRange> {
        self.props().buffered.clone()
    }

    fn set_volume(&mut self, volume: f64) {
        self.command(json!(["set_property", "volume", (volume * 100.0).round()]));
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.command(json!(["set_property", "fullscreen", fullscreen]));
    }

    fn request_frame(&mut self, request: u64) {
        let path = std::env::temp_dir().join(format!("reeltui-frame-{}.jpg", uuid::Uuid::new_v4()));
        let line = json!({
            "command": ["screenshot-to-file", path.display().to_string(), "video"],
            "request_id": request,
        });
        self.props().pending_frames.insert(request, path);
        let _ = self.commands.send(line);
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    fn destroy(&mut self) {
        self.command(json!(["quit"]));
        self.ipc.abort();

        if let Some(mut child) = self.child.take() {
            #[cfg(unix)]
            if let Some(pid) = child.id() {
                // SAFETY: signalling our own child process
                unsafe {
                    libc::kill(pid as libc::pid_t, libc::SIGTERM);
                }
            }
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        if tokio::time::timeout(QUIT_GRACE, child.wait()).await.is_err() {
                            let _ = child.start_kill();
                        }
                    });
                }
                Err(_) => {
                    let _ = child.start_kill();
                }
            }
        }
        let _ = std::fs::remove_file(&self.socket);
        for (_, path) in self.props().pending_frames.drain() {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl Drop for MpvSession {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.destroy();
        }
    }
}

// =============================================================================
// IPC
// =============================================================================

fn lock(props: &Mutex<Props>) -> std::sync::MutexGuard<'_, Props> {
    props.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Wait for mpv to create its socket
async fn connect(socket: &Path, attempts: u32) -> Result<UnixStream, PlaybackError> {
    let mut last_err = None;
    for _ in 0..attempts {
        match UnixStream::connect(socket).await {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
        tokio::time::sleep(CONNECT_INTERVAL).await;
    }
    Err(PlaybackError::Ipc(match last_err {
        Some(e) => format!("{}: {}", socket.display(), e),
        None => format!("{}: socket never appeared", socket.display()),
    }))
}

async fn run_ipc(
    socket: PathBuf,
    attempts: u32,
    mut commands: mpsc::UnboundedReceiver<Value>,
    events: mpsc::UnboundedSender<MediaEvent>,
    props: Arc<Mutex<Props>>,
) {
    let stream = match connect(&socket, attempts).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(error = %e, "mpv IPC connect failed");
            let _ = events.send(MediaEvent::Error(e.to_string()));
            return;
        }
    };
    tracing::debug!(socket = %socket.display(), "mpv IPC connected");

    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    for (id, name) in OBSERVED {
        let line = json!({ "command": ["observe_property", id, name] });
        if write_line(&mut write_half, &line).await.is_err() {
            let _ = events.send(MediaEvent::Error("Media engine closed the connection".into()));
            return;
        }
    }

    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(cmd) => {
                    if let Err(e) = write_line(&mut write_half, &cmd).await {
                        tracing::debug!(error = %e, "mpv IPC write failed");
                        break;
                    }
                }
                None => break,
            },
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let Ok(msg) = serde_json::from_str::<Value>(&line) else {
                        continue;
                    };
                    if let Some(reply) = frame_reply(&msg, &props) {
                        deliver_frame(reply, &events).await;
                        continue;
                    }
                    for event in message_events(&msg, &props) {
                        if events.send(event).is_err() {
                            return;
                        }
                    }
                }
                Ok(None) | Err(_) => {
                    let _ = events.send(MediaEvent::Error("Media engine exited".into()));
                    break;
                }
            },
        }
    }
}

async fn write_line(writer: &mut tokio::net::unix::OwnedWriteHalf, value: &Value) -> std::io::Result<()> {
    let mut line = value.to_string();
    line.push('\n');
    writer.write_all(line.as_bytes()).await
}

/// mpv's answer to a pending screenshot request
#[derive(Debug, PartialEq)]
struct FrameReply {
    request: u64,
    path: PathBuf,
    written: bool,
}

/// Match a command reply against the pending screenshot requests
fn frame_reply(msg: &Value, props: &Mutex<Props>) -> Option<FrameReply> {
    if msg.get("event").is_some() {
        return None;
    }
    let request = msg.get("request_id")?.as_u64()?;
    let path = lock(props).pending_frames.remove(&request)?;
    Some(FrameReply {
        request,
        path,
        written: msg.get("error").and_then(Value::as_str) == Some("success"),
    })
}

async fn deliver_frame(reply: FrameReply, events: &mpsc::UnboundedSender<MediaEvent>) {
    if reply.written {
        match tokio::fs::read(&reply.path).await {
            Ok(bytes) if !bytes.is_empty() => {
                let _ = events.send(MediaEvent::FrameCaptured {
                    request: reply.request,
                    frame: FrameSnapshot::jpeg(bytes),
                });
            }
            Ok(_) => tracing::debug!(path = %reply.path.display(), "empty screenshot"),
            Err(e) => tracing::debug!(path = %reply.path.display(), error = %e, "screenshot unreadable"),
        }
    } else {
        tracing::debug!(request = reply.request, "screenshot rejected");
    }
    let _ = tokio::fs::remove_file(&reply.path).await;
}

/// Translate one IPC message into events, updating the property cache
fn message_events(msg: &Value, props: &Mutex<Props>) -> Vec<MediaEvent> {
    match msg.get("event").and_then(Value::as_str) {
        Some("property-change") => {
            let name = msg.get("name").and_then(Value::as_str).unwrap_or_default();
            property_change(name, msg.get("data").unwrap_or(&Value::Null), props)
        }
        Some("end-file") => {
            if msg.get("reason").and_then(Value::as_str) == Some("error") {
                let detail = msg
                    .get("file_error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                vec![MediaEvent::Error(format!("Could not load media: {}", detail))]
            } else {
                Vec::new()
            }
        }
        _ => {
            if let Some(err) = msg.get("error").and_then(Value::as_str) {
                if err != "success" {
                    tracing::debug!(error = err, "mpv command rejected");
                }
            }
            Vec::new()
        }
    }
}

fn property_change(name: &str, data: &Value, props: &Mutex<Props>) -> Vec<MediaEvent> {
    let mut props = lock(props);
    match name {
        "time-pos" => match data.as_f64() {
            Some(time) => {
                props.time_pos = time;
                vec![MediaEvent::TimeUpdate { time }]
            }
            None => Vec::new(),
        },
        "duration" => data
            .as_f64()
            .map(|duration| MediaEvent::LoadedMetadata { duration })
            .into_iter()
            .collect(),
        "pause" => match data.as_bool() {
            Some(true) => vec![MediaEvent::Pause],
            Some(false) => vec![MediaEvent::Play],
            None => Vec::new(),
        },
        "eof-reached" if data.as_bool() == Some(true) => vec![MediaEvent::Ended],
        "fullscreen" => data
            .as_bool()
            .map(MediaEvent::FullscreenChange)
            .into_iter()
            .collect(),
        "demuxer-cache-state" => {
            props.buffered = data
                .get("seekable-ranges")
                .and_then(Value::as_array)
                .map(|ranges| {
                    ranges
                        .iter()
                        .filter_map(|r| {
                            Some(TimeRange::new(
                                r.get("start")?.as_f64()?,
                                r.get("end")?.as_f64()?,
                            ))
                        })
                        .collect()
                })
                .unwrap_or_default();
            Vec::new()
        }
        _ => Vec::new(),
    }
}
