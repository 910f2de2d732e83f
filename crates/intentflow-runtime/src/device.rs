//! Platform capabilities used by action handlers.
//!
//! The embedding application constructs a [`Device`] for its platform and
//! passes it to [`crate::HandlerRegistry::standard`].  Handlers never reach
//! for platform services on their own.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Local;
use tracing::info;

use crate::error::DeviceError;

/// Which camera to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lens {
    Front,
    Back,
}

impl Lens {
    /// Parse a lens name; anything other than `back` is the front camera.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("back") => Self::Back,
            _ => Self::Front,
        }
    }
}

impl std::fmt::Display for Lens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Front => write!(f, "front"),
            Self::Back => write!(f, "back"),
        }
    }
}

/// Requested location fix quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    High,
    Balanced,
    Low,
}

impl Accuracy {
    /// Parse an accuracy name; unknown values mean `balanced`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("high") => Self::High,
            Some("low") => Self::Low,
            _ => Self::Balanced,
        }
    }
}

impl std::fmt::Display for Accuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Balanced => write!(f, "balanced"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// The side effects a flow can have on the device.
#[async_trait]
pub trait Device: Send + Sync {
    async fn notify(&self, title: &str, message: &str) -> Result<(), DeviceError>;

    async fn send_sms(&self, phone: &str, body: &str) -> Result<(), DeviceError>;

    async fn set_wifi(&self, enabled: bool) -> Result<(), DeviceError>;

    /// Play a sound; `None` means the default notification sound.
    async fn play_sound(&self, uri: Option<&str>) -> Result<(), DeviceError>;

    async fn set_alarm(&self, hour: u8, minute: u8, message: &str) -> Result<(), DeviceError>;

    /// Take a photo and return where it was stored.
    async fn capture_photo(&self, lens: Lens) -> Result<String, DeviceError>;

    /// Return the current position as text (e.g. `"48.8566,2.3522"`).
    async fn current_location(&self, accuracy: Accuracy) -> Result<String, DeviceError>;
}

/// A dry-run device that logs every call and returns synthetic values.
#[derive(Debug, Default)]
pub struct LoggingDevice {
    photos: AtomicU64,
}

impl LoggingDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Device for LoggingDevice {
    async fn notify(&self, title: &str, message: &str) -> Result<(), DeviceError> {
        info!(title, message, "device: notification");
        Ok(())
    }

    async fn send_sms(&self, phone: &str, body: &str) -> Result<(), DeviceError> {
        info!(phone, body, "device: sms");
        Ok(())
    }

    async fn set_wifi(&self, enabled: bool) -> Result<(), DeviceError> {
        info!(enabled, "device: wifi");
        Ok(())
    }

    async fn play_sound(&self, uri: Option<&str>) -> Result<(), DeviceError> {
        info!(uri = uri.unwrap_or("default"), "device: sound");
        Ok(())
    }

    async fn set_alarm(&self, hour: u8, minute: u8, message: &str) -> Result<(), DeviceError> {
        info!(hour, minute, message, "device: alarm");
        Ok(())
    }

    async fn capture_photo(&self, lens: Lens) -> Result<String, DeviceError> {
        let n = self.photos.fetch_add(1, Ordering::Relaxed) + 1;
        let name = format!("IMG_{}_{n}.jpg", Local::now().format("%Y%m%d_%H%M%S"));
        info!(%lens, file = %name, "device: photo");
        Ok(name)
    }

    async fn current_location(&self, accuracy: Accuracy) -> Result<String, DeviceError> {
        info!(%accuracy, "device: location");
        Ok("0.000000,0.000000".to_owned())
    }
}
