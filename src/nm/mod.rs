//! NetworkManager connection source backed by `nmcli`.
//!
//! Queries run synchronously on the caller's thread. Commands (`up`, `down`,
//! `modify`) are spawned on a background thread and only logged; their effect
//! comes back through the watcher as device events.

pub mod terse;
pub mod watcher;

use std::collections::HashMap;
use std::process::{Command, Output, Stdio};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::core::{ConnectionSource, SourceEvent, Subscription};
use crate::error::SourceError;
use crate::state::{ActiveConnection, ActiveDevice, ConnectionCategory, ConnectionProfile, ProfileKey};
use crate::{log_debug, log_error, log_info};

/// Read-only `nmcli` access, cheap to clone into the watcher thread.
#[derive(Debug, Clone)]
pub struct NmcliQuery {
    program: String,
    category: ConnectionCategory,
}

impl NmcliQuery {
    #[must_use]
    pub fn new(program: impl Into<String>, category: ConnectionCategory) -> Self {
        Self {
            program: program.into(),
            category,
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<String, SourceError> {
        let output = self
            .command(args)
            .output()
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        check_status(&self.program, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Every profile; `interface_name` is only looked up for the tracked category.
    pub fn profiles(&self) -> Result<Vec<ConnectionProfile>, SourceError> {
        let rows = terse::parse_connections(&self.run(&[
            "-t",
            "-f",
            "NAME,UUID,TYPE,AUTOCONNECT",
            "connection",
            "show",
        ])?)?;

        rows.into_iter()
            .map(|row| {
                let interface_name = if row.category == self.category {
                    self.interface_name(&row.uuid, &row.name)?
                } else {
                    String::new()
                };
                Ok(ConnectionProfile {
                    key: ProfileKey::new(row.uuid),
                    id: row.name,
                    interface_name,
                    category: row.category,
                    autoconnect: row.autoconnect,
                })
            })
            .collect()
    }

    /// `connection.interface-name`, falling back to the profile name like
    /// NetworkManager does for WireGuard profiles without one.
    fn interface_name(&self, uuid: &str, name: &str) -> Result<String, SourceError> {
        let value = self.run(&[
            "-g",
            "connection.interface-name",
            "connection",
            "show",
            "uuid",
            uuid,
        ])?;
        let value = value.trim();
        Ok(if value.is_empty() {
            name.to_string()
        } else {
            value.to_string()
        })
    }

    pub fn devices(&self) -> Result<Vec<ActiveDevice>, SourceError> {
        terse::parse_devices(&self.run(&["-t", "-f", "DEVICE,TYPE", "device", "status"])?)
    }

    pub fn active_connections(&self) -> Result<Vec<ActiveConnection>, SourceError> {
        terse::parse_active(&self.run(&[
            "-t",
            "-f",
            "NAME,UUID,DEVICE",
            "connection",
            "show",
            "--active",
        ])?)
    }
}

fn check_status(program: &str, output: &Output) -> Result<(), SourceError> {
    if output.status.success() {
        return Ok(());
    }
    Err(SourceError::CommandFailed {
        program: program.to_string(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// [`ConnectionSource`] talking to NetworkManager through `nmcli`.
pub struct NmcliSource {
    query: NmcliQuery,
    poll_interval: Duration,
    staged_autoconnect: HashMap<ProfileKey, bool>,
}

impl NmcliSource {
    #[must_use]
    pub fn new(program: impl Into<String>, category: ConnectionCategory, poll_interval: Duration) -> Self {
        Self {
            query: NmcliQuery::new(program, category),
            poll_interval,
            staged_autoconnect: HashMap::new(),
        }
    }

    /// Runs a mutating command on a background thread; failures are logged.
    fn spawn_command(&self, label: String, args: Vec<String>) -> Result<(), SourceError> {
        let mut cmd = self.query.command(&args.iter().map(String::as_str).collect::<Vec<_>>());
        let program = self.query.program.clone();
        let child = cmd.spawn().map_err(|source| SourceError::Spawn {
            program: program.clone(),
            source,
        })?;

        log_debug!("NM", "{label}: {program} {}", args.join(" "));
        thread::spawn(move || match child.wait_with_output() {
            Ok(output) => match check_status(&program, &output) {
                Ok(()) => log_info!("NM", "{label}: done"),
                Err(e) => log_error!("NM", "{label}: {e}"),
            },
            Err(e) => log_error!("NM", "{label}: {e}"),
        });
        Ok(())
    }
}

impl ConnectionSource for NmcliSource {
    fn list_profiles(&self) -> Result<Vec<ConnectionProfile>, SourceError> {
        self.query.profiles()
    }

    fn list_devices(&self) -> Result<Vec<ActiveDevice>, SourceError> {
        self.query.devices()
    }

    fn list_active_connections(&self) -> Result<Vec<ActiveConnection>, SourceError> {
        self.query.active_connections()
    }

    fn activate(&mut self, profile: &ProfileKey) -> Result<(), SourceError> {
        self.spawn_command(
            format!("up {profile}"),
            vec![
                "connection".into(),
                "up".into(),
                "uuid".into(),
                profile.to_string(),
            ],
        )
    }

    fn deactivate(&mut self, connection: &ActiveConnection) -> Result<(), SourceError> {
        self.spawn_command(
            format!("down {}", connection.id),
            vec![
                "connection".into(),
                "down".into(),
                "uuid".into(),
                connection.profile.to_string(),
            ],
        )
    }

    fn set_autoconnect(&mut self, profile: &ProfileKey, enabled: bool) -> Result<(), SourceError> {
        self.staged_autoconnect.insert(profile.clone(), enabled);
        Ok(())
    }

    fn commit(&mut self, profile: &ProfileKey) -> Result<(), SourceError> {
        let Some(enabled) = self.staged_autoconnect.remove(profile) else {
            log_debug!("NM", "Nothing staged for {profile}");
            return Ok(());
        };
        self.spawn_command(
            format!("autoconnect {profile}"),
            vec![
                "connection".into(),
                "modify".into(),
                "uuid".into(),
                profile.to_string(),
                "connection.autoconnect".into(),
                if enabled { "yes" } else { "no" }.into(),
            ],
        )
    }

    fn subscribe(&mut self, events: Sender<SourceEvent>) -> Result<Subscription, SourceError> {
        let baseline = watcher::Snapshot::capture(&self.query)?;
        watcher::spawn(self.query.clone(), baseline, self.poll_interval, events)
    }
}
