//! Resource registry: the single owner of every exposed value.
//!
//! ```text
//!  sensors / button ──set_value──▶ ┌──────────────────┐ ──take_notification──▶ transport
//!                                  │ ResourceRegistry │
//!  remote manager ──handle_remote_*▶│  values · perms  │ ──on_write / on_execute──▶ AppCommand
//!                                  └──────────────────┘
//! ```
//!
//! All value mutation goes through here, so change notification has exactly
//! one source.  The registry is only touched from the control loop and has
//! no internal locking.
//!
//! Notifications are coalesced: a resource that changes several times
//! before the transport drains the queue is reported once, with its latest
//! value.

use heapless::{Deque, Vec};
use log::{debug, warn};

use crate::app::commands::AppCommand;
use crate::error::RegistryError;

use super::methods::Methods;
use super::path::ResourcePath;

/// Capacity of the resource table.
pub const MAX_RESOURCES: usize = 32;

/// Handler invoked after an accepted remote WRITE, with the committed value.
pub type WriteHandler = fn(&ResourcePath, &str) -> Option<AppCommand>;

/// Handler invoked for an accepted remote EXECUTE, with the argument payload.
pub type ExecuteHandler = fn(&ResourcePath, &str) -> Option<AppCommand>;

/// Handler invoked with the delivery outcome of a notification.
pub type NotifyResultHandler = fn(&ResourcePath, DeliveryStatus);

/// Outcome of an observation notification, as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Handed to the network stack.
    Sent,
    /// Acknowledged by the server.
    Delivered,
    /// Could not be sent (queue full, encode error, link down).
    SendFailed,
    /// The server started observing the resource.
    Subscribed,
    /// The server stopped observing the resource.
    Unsubscribed,
}

/// Opaque index into the registry, returned by [`ResourceRegistry::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(u8);

impl ResourceHandle {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single addressable value.
pub struct Resource {
    path: ResourcePath,
    name: &'static str,
    value: String,
    methods: Methods,
    observable: bool,
    notify_pending: bool,
    on_write: Option<WriteHandler>,
    on_execute: Option<ExecuteHandler>,
    on_notify_result: Option<NotifyResultHandler>,
}

impl Resource {
    pub fn path(&self) -> ResourcePath {
        self.path
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn methods(&self) -> Methods {
        self.methods
    }

    pub fn is_observable(&self) -> bool {
        self.observable
    }
}

/// Owns all resources and the pending-notification queue.
pub struct ResourceRegistry {
    resources: Vec<Resource, MAX_RESOURCES>,
    pending: Deque<ResourceHandle, MAX_RESOURCES>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            pending: Deque::new(),
        }
    }

    // ── Creation ──────────────────────────────────────────────

    /// Register a new resource.
    ///
    /// Fails with `InvalidPath` for malformed path text, `DuplicatePath` if
    /// the path is taken, and `RegistryFull` when the table is exhausted.
    /// The registry is unchanged on failure.
    pub fn create(
        &mut self,
        path: &str,
        initial_value: &str,
        methods: Methods,
        observable: bool,
    ) -> Result<ResourceHandle, RegistryError> {
        let path = ResourcePath::parse(path)?;
        if self.find(&path).is_some() {
            return Err(RegistryError::DuplicatePath);
        }

        let handle = ResourceHandle(self.resources.len() as u8);
        self.resources
            .push(Resource {
                path,
                name: "",
                value: String::from(initial_value),
                methods,
                observable,
                notify_pending: false,
                on_write: None,
                on_execute: None,
                on_notify_result: None,
            })
            .map_err(|_| RegistryError::RegistryFull)?;

        debug!("registry: created {} = {:?}", path, initial_value);
        Ok(handle)
    }

    /// Attach a human-readable name (e.g. `"temperature"`).
    pub fn set_name(&mut self, handle: ResourceHandle, name: &'static str) {
        if let Some(r) = self.resources.get_mut(handle.index()) {
            r.name = name;
        }
    }

    pub fn attach_write_handler(&mut self, handle: ResourceHandle, handler: WriteHandler) {
        if let Some(r) = self.resources.get_mut(handle.index()) {
            r.on_write = Some(handler);
        }
    }

    pub fn attach_execute_handler(&mut self, handle: ResourceHandle, handler: ExecuteHandler) {
        if let Some(r) = self.resources.get_mut(handle.index()) {
            r.on_execute = Some(handler);
        }
    }

    pub fn attach_notify_result_handler(
        &mut self,
        handle: ResourceHandle,
        handler: NotifyResultHandler,
    ) {
        if let Some(r) = self.resources.get_mut(handle.index()) {
            r.on_notify_result = Some(handler);
        }
    }

    // ── Local access ──────────────────────────────────────────

    /// Store a value produced on the device (sensor, button counter).
    ///
    /// Never fails for handles minted by this registry.  Observable
    /// resources get a notification queued; the caller is not blocked.
    pub fn set_value(&mut self, handle: ResourceHandle, value: &str) {
        let Some(r) = self.resources.get_mut(handle.index()) else {
            warn!("registry: set_value on unknown handle {:?}", handle);
            return;
        };
        r.value.clear();
        r.value.push_str(value);

        if r.observable && !r.notify_pending {
            r.notify_pending = true;
            if self.pending.push_back(handle).is_err() {
                // Unreachable while the queue is as large as the table.
                warn!("registry: notification queue full, dropping {}", r.path);
                r.notify_pending = false;
            }
        }
    }

    /// Latest committed value (empty for a foreign handle).
    pub fn get_value(&self, handle: ResourceHandle) -> &str {
        self.resources
            .get(handle.index())
            .map_or("", |r| r.value.as_str())
    }

    pub fn get(&self, handle: ResourceHandle) -> Option<&Resource> {
        self.resources.get(handle.index())
    }

    /// Look up a handle by path.
    pub fn find(&self, path: &ResourcePath) -> Option<ResourceHandle> {
        self.resources
            .iter()
            .position(|r| r.path == *path)
            .map(|i| ResourceHandle(i as u8))
    }

    pub fn path(&self, handle: ResourceHandle) -> Option<ResourcePath> {
        self.resources.get(handle.index()).map(|r| r.path)
    }

    /// All registered paths, in creation order (used for the registration
    /// announcement).
    pub fn paths(&self) -> impl Iterator<Item = ResourcePath> + '_ {
        self.resources.iter().map(|r| r.path)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    // ── Remote access ─────────────────────────────────────────

    /// Remote READ.  Requires `Methods::READ`.
    pub fn handle_remote_read(&self, handle: ResourceHandle) -> Result<&str, RegistryError> {
        let r = self
            .resources
            .get(handle.index())
            .ok_or(RegistryError::UnknownResource)?;
        if !r.methods.contains(Methods::READ) {
            return Err(RegistryError::MethodNotAllowed);
        }
        Ok(&r.value)
    }

    /// Remote WRITE.  Requires `Methods::WRITE`.
    ///
    /// The value is committed before `on_write` runs, so the handler sees
    /// the new value.  Whatever command the handler returns is passed back
    /// for the dispatcher to apply.
    pub fn handle_remote_write(
        &mut self,
        handle: ResourceHandle,
        value: &str,
    ) -> Result<Option<AppCommand>, RegistryError> {
        let r = self
            .resources
            .get(handle.index())
            .ok_or(RegistryError::UnknownResource)?;
        if !r.methods.contains(Methods::WRITE) {
            return Err(RegistryError::MethodNotAllowed);
        }
        let (path, on_write) = (r.path, r.on_write);

        self.set_value(handle, value);
        Ok(on_write.and_then(|f| f(&path, self.get_value(handle))))
    }

    /// Remote EXECUTE.  Requires `Methods::EXECUTE`.
    ///
    /// Handlers must not do long work here; they return a command instead
    /// (e.g. [`AppCommand::StartBlink`]).
    pub fn handle_remote_execute(
        &mut self,
        handle: ResourceHandle,
        arg: &str,
    ) -> Result<Option<AppCommand>, RegistryError> {
        let r = self
            .resources
            .get(handle.index())
            .ok_or(RegistryError::UnknownResource)?;
        if !r.methods.contains(Methods::EXECUTE) {
            return Err(RegistryError::MethodNotAllowed);
        }
        Ok(r.on_execute.and_then(|f| f(&r.path, arg)))
    }

    // ── Notifications ─────────────────────────────────────────

    /// Pop the oldest resource with an unsent change notification.
    pub fn take_notification(&mut self) -> Option<ResourceHandle> {
        let handle = self.pending.pop_front()?;
        if let Some(r) = self.resources.get_mut(handle.index()) {
            r.notify_pending = false;
        }
        Some(handle)
    }

    /// Number of resources waiting to be notified.
    pub fn pending_notifications(&self) -> usize {
        self.pending.len()
    }

    /// Route a transport delivery report to the resource's handler.
    pub fn report_delivery(
        &self,
        path: &ResourcePath,
        status: DeliveryStatus,
    ) -> Result<(), RegistryError> {
        let handle = self.find(path).ok_or(RegistryError::UnknownResource)?;
        let r = &self.resources[handle.index()];
        if let Some(f) = r.on_notify_result {
            f(&r.path, status);
        }
        Ok(())
    }
}
