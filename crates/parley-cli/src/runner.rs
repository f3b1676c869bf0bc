//! Runs a parsed script against an in-process database.

use std::io::Write;

use parley_app::{
    AppAction, Authenticator, FileStore, LocalUser, Runtime, SelectedFile, Session,
    SessionConfig, UploadMetadata, UploadModal, UserPanel,
};
use parley_core::{BackendError, DbPath};
use parley_harness::{MemoryBackend, MemoryDatabase};
use serde_json::json;

use crate::{CliError, Command, TextDriver, write_sidebar};

/// Who runs the script and how the session is configured.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Local user.
    pub user: LocalUser,
    /// Session configuration.
    pub config: SessionConfig,
}

/// Upload target that keeps objects in memory.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    objects: Vec<(String, UploadMetadata)>,
}

impl MemoryFileStore {
    /// Uploaded file names with their metadata.
    pub fn objects(&self) -> &[(String, UploadMetadata)] {
        &self.objects
    }
}

impl FileStore for MemoryFileStore {
    fn upload(&mut self, file: &SelectedFile, metadata: &UploadMetadata) -> Result<(), BackendError> {
        self.objects.push((file.name.clone(), metadata.clone()));
        Ok(())
    }
}

/// Signs out by disconnecting the local client.
struct DatabaseAuth<'a> {
    db: &'a MemoryDatabase,
    client: usize,
}

impl Authenticator for DatabaseAuth<'_> {
    fn sign_out(&mut self) -> Result<(), BackendError> {
        self.db.set_connected(self.client, false);
        Ok(())
    }
}

/// Scripted session with its database and sidebar widgets.
pub struct Runner<W: Write> {
    db: MemoryDatabase,
    runtime: Runtime<MemoryBackend, TextDriver<W>>,
    panel: UserPanel,
    upload: UploadModal,
    store: MemoryFileStore,
}

impl<W: Write> Runner<W> {
    /// Sign `options.user` in, start the session and process the replay.
    pub fn start(options: RunOptions, out: W) -> Result<Self, CliError> {
        let db = MemoryDatabase::new();
        let user = options.user;
        db.write(&DbPath::new("users").child(&user.id), json!({ "name": user.name }));

        let upload = UploadModal::new(options.config.allowed_upload_types.iter().cloned());
        let panel = UserPanel::new(user.clone());
        let session = Session::new(db.connect_client(), user, options.config);
        let mut runtime = Runtime::new(session, TextDriver::new(out));
        runtime.start()?;

        Ok(Self { db, runtime, panel, upload, store: MemoryFileStore::default() })
    }

    /// Execute every command in order.
    ///
    /// User-facing failures are written as `!` lines and do not stop the
    /// run; only output errors abort it.
    pub fn run(&mut self, commands: &[Command]) -> Result<(), CliError> {
        for command in commands {
            tracing::debug!(?command, "executing");
            match self.execute(command) {
                Ok(()) => {},
                Err(CliError::Session(e)) => self.say(&format!("!  {e}"))?,
                Err(e) => return Err(e),
            }
            self.runtime.run_until_idle()?;
        }
        Ok(())
    }

    /// The driven session.
    pub fn session(&self) -> &Session<MemoryBackend> {
        self.runtime.session()
    }

    /// Files uploaded so far.
    pub fn store(&self) -> &MemoryFileStore {
        &self.store
    }

    /// Tear the session down and return the output sink.
    pub fn finish(mut self) -> W {
        self.runtime.stop();
        self.runtime.into_parts().1.into_inner()
    }

    fn execute(&mut self, command: &Command) -> Result<(), CliError> {
        let handle = self.runtime.session().backend().handle();
        match command {
            Command::Channel { id, name, description } => {
                self.db.write(
                    &DbPath::new("channels").child(id),
                    json!({ "name": name, "desc": description, "createdBy": { "name": "someone" } }),
                );
            },
            Command::Create { name, description } => {
                let id = self.runtime.session_mut().create_channel(name, description)?;
                tracing::info!(channel = %id, "created");
            },
            Command::Message { channel, count } => {
                let path = DbPath::new("messages").child(channel);
                for _ in 0..*count {
                    self.db.push(&path, json!({ "content": "..." }));
                }
            },
            Command::Select(id) => {
                let actions = self.runtime.session_mut().select_channel(id)?;
                self.dispatch(&actions)?;
            },
            Command::Peer { id, name } => {
                self.db.write(&DbPath::new("users").child(id), json!({ "name": name }));
            },
            Command::Online(id) => self.db.write(&DbPath::new("presence").child(id), json!(true)),
            Command::Offline(id) => self.db.remove(&DbPath::new("presence").child(id)),
            Command::Dm(id) => {
                let actions = self.runtime.session_mut().select_direct_peer(id)?;
                self.dispatch(&actions)?;
            },
            Command::Star(id) => self.runtime.session_mut().star_channel(id)?,
            Command::Unstar(id) => self.runtime.session_mut().unstar_channel(id)?,
            Command::Disconnect => self.db.set_connected(handle, false),
            Command::Connect => self.db.set_connected(handle, true),
            Command::Upload(name) => {
                self.upload.open();
                self.upload.select_file(Some(SelectedFile::new(name.as_str(), Vec::new())));
                let result = self.upload.send_file(&mut self.store);
                self.upload.close();
                result?;
                let line = self
                    .store
                    .objects()
                    .last()
                    .map(|(name, meta)| format!("   uploaded {name} ({})", meta.content_type));
                if let Some(line) = line {
                    self.say(&line)?;
                }
            },
            Command::SignOut => {
                let mut auth = DatabaseAuth { db: &self.db, client: handle };
                self.panel.sign_out(&mut auth)?;
                self.runtime.stop();
                self.say("   signed out")?;
            },
            Command::Show => {
                let (session, driver) = self.runtime.parts_mut();
                write_sidebar(driver.out(), session, &self.panel)?;
            },
        }
        Ok(())
    }

    fn dispatch(&mut self, actions: &[AppAction]) -> Result<(), CliError> {
        Ok(self.runtime.dispatch(actions)?)
    }

    fn say(&mut self, line: &str) -> Result<(), CliError> {
        Ok(writeln!(self.runtime.parts_mut().1.out(), "{line}")?)
    }
}
