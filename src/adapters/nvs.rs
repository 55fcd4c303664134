//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] and [`CredentialStore`].  Two blobs matter:
//!
//! | Namespace   | Key        | Contents                          |
//! |-------------|------------|-----------------------------------|
//! | `cloudnode` | `nodecfg`  | postcard-encoded [`NodeConfig`]   |
//! | `lwm2m`     | `security` | server security object            |
//!
//! The security object is written at provisioning time; this crate only
//! checks that it exists.  Config is range-checked before it is written.
//! Off target, an in-memory map stands in for flash.

use log::{debug, info};
#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(not(target_os = "espidf"))]
use std::{cell::RefCell, collections::HashMap};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::app::ports::{ConfigError, ConfigPort, CredentialStore};
use crate::config::NodeConfig;

const CONFIG_NAMESPACE: &str = "cloudnode";
const CONFIG_KEY: &str = "nodecfg";

pub const CRED_NAMESPACE: &str = "lwm2m";
/// Key of the server security object written at provisioning time.
pub const CRED_SECURITY_KEY: &str = "security";

/// Larger blobs are treated as corrupt rather than allocated.
#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 4000;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    blobs: RefCell<HashMap<(String, String), Vec<u8>>>,
}

impl NvsAdapter {
    /// Initialise NVS flash, erasing the partition when it is full or was
    /// written by a newer IDF.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS use.
            let mut rc = unsafe { nvs_flash_init() };
            if rc == ESP_ERR_NVS_NO_FREE_PAGES || rc == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("nvs: erasing partition (rc={})", rc);
                // SAFETY: as above.
                rc = unsafe {
                    if nvs_flash_erase() == ESP_OK {
                        nvs_flash_init()
                    } else {
                        ESP_FAIL
                    }
                };
            }
            if rc != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("nvs: flash ready");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("nvs: in-memory backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            blobs: RefCell::new(HashMap::new()),
        })
    }

    // ── Blob primitives ───────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn get_blob(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, ConfigError> {
        Ok(self
            .blobs
            .borrow()
            .get(&(namespace.to_owned(), key.to_owned()))
            .cloned())
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_blob(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        self.blobs
            .borrow_mut()
            .insert((namespace.to_owned(), key.to_owned()), data.to_vec());
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn has_blob(&self, namespace: &str, key: &str) -> bool {
        self.blobs
            .borrow()
            .contains_key(&(namespace.to_owned(), key.to_owned()))
    }

    #[cfg(target_os = "espidf")]
    fn get_blob(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, ConfigError> {
        let nvs = match NvsHandle::open(namespace, false) {
            Ok(h) => h,
            Err(rc) if rc == ESP_ERR_NVS_NOT_FOUND => return Ok(None),
            Err(_) => return Err(ConfigError::IoError),
        };
        let key = c_name(key);

        let mut size: usize = 0;
        // SAFETY: a null buffer only queries the blob length.
        let rc = unsafe { nvs_get_blob(nvs.0, key.as_ptr().cast(), core::ptr::null_mut(), &mut size) };
        if rc == ESP_ERR_NVS_NOT_FOUND {
            return Ok(None);
        }
        if rc != ESP_OK {
            return Err(ConfigError::IoError);
        }
        if size > MAX_BLOB_SIZE {
            return Err(ConfigError::Corrupted);
        }

        let mut buf = vec![0u8; size];
        // SAFETY: buf holds exactly `size` bytes.
        let rc = unsafe { nvs_get_blob(nvs.0, key.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size) };
        if rc != ESP_OK {
            return Err(ConfigError::IoError);
        }
        Ok(Some(buf))
    }

    #[cfg(target_os = "espidf")]
    fn set_blob(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let nvs = NvsHandle::open(namespace, true).map_err(|_| ConfigError::IoError)?;
        let name = c_name(key);
        // SAFETY: name is NUL-terminated and data outlives the call.
        let mut rc = unsafe { nvs_set_blob(nvs.0, name.as_ptr().cast(), data.as_ptr().cast(), data.len()) };
        if rc == ESP_OK {
            // SAFETY: handle is open for writing.
            rc = unsafe { nvs_commit(nvs.0) };
        }
        if rc != ESP_OK {
            warn!("nvs: write {}/{} failed (rc={})", namespace, key, rc);
            return Err(ConfigError::IoError);
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn has_blob(&self, namespace: &str, key: &str) -> bool {
        let Ok(nvs) = NvsHandle::open(namespace, false) else {
            return false;
        };
        let key = c_name(key);
        // SAFETY: key is NUL-terminated; a null type pointer is allowed.
        unsafe { nvs_find_key(nvs.0, key.as_ptr().cast(), core::ptr::null_mut()) == ESP_OK }
    }
}

// ── ESP-IDF handle ────────────────────────────────────────────

/// Open namespace, closed on drop.
#[cfg(target_os = "espidf")]
struct NvsHandle(nvs_handle_t);

#[cfg(target_os = "espidf")]
impl NvsHandle {
    fn open(namespace: &str, write: bool) -> Result<Self, esp_err_t> {
        let ns = c_name(namespace);
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        // SAFETY: ns is NUL-terminated and outlives the call.
        let rc = unsafe { nvs_open(ns.as_ptr().cast(), mode, &mut handle) };
        if rc == ESP_OK { Ok(Self(handle)) } else { Err(rc) }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for NvsHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was opened by `open` and is not used afterwards.
        unsafe { nvs_close(self.0) }
    }
}

/// NUL-terminated copy of an NVS name (15 chars max).
#[cfg(target_os = "espidf")]
fn c_name(name: &str) -> [u8; 16] {
    let mut buf = [0u8; 16];
    let len = name.len().min(15);
    buf[..len].copy_from_slice(&name.as_bytes()[..len]);
    buf
}

// ── Validation ────────────────────────────────────────────────

fn validate_config(cfg: &NodeConfig) -> Result<(), ConfigError> {
    let checks: [(bool, &'static str); 6] = [
        (
            (10..=1000).contains(&cfg.loop_interval_ms),
            "loop_interval_ms must be 10..=1000",
        ),
        (
            (100..=3_600_000).contains(&cfg.sensor_interval_ms),
            "sensor_interval_ms must be 100..=3600000",
        ),
        (
            cfg.sensor_interval_ms >= cfg.loop_interval_ms,
            "sensor_interval_ms must be >= loop_interval_ms",
        ),
        (
            (1..=1000).contains(&cfg.pulse_width_ms),
            "pulse_width_ms must be 1..=1000",
        ),
        (
            (1..=64).contains(&cfg.max_transport_events_per_tick),
            "max_transport_events_per_tick must be 1..=64",
        ),
        (
            cfg.default_pattern
                .bytes()
                .all(|b| b.is_ascii_digit() || b == b':' || b == b' '),
            "default_pattern must be colon-separated milliseconds",
        ),
    ];
    match checks.iter().find(|(ok, _)| !ok) {
        Some(&(_, reason)) => Err(ConfigError::ValidationFailed(reason)),
        None => Ok(()),
    }
}

// ── Ports ─────────────────────────────────────────────────────

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<NodeConfig, ConfigError> {
        match self.get_blob(CONFIG_NAMESPACE, CONFIG_KEY)? {
            Some(bytes) => {
                let cfg = postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                info!("nvs: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            None => {
                info!("nvs: no stored config, using defaults");
                Ok(NodeConfig::default())
            }
        }
    }

    fn save(&self, config: &NodeConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.set_blob(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)?;
        debug!("nvs: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

impl CredentialStore for NvsAdapter {
    fn is_ready(&self) -> bool {
        self.has_blob(CRED_NAMESPACE, CRED_SECURITY_KEY)
    }
}
