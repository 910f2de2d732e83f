//! Action handlers.  Side effects go through the injected [`Device`]; a
//! device error becomes a FAILED step rather than aborting the run.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use intentflow_graph::FlowBlock;

use crate::device::{Accuracy, Device, Lens};
use crate::error::{DeviceError, HandlerError};
use crate::handler::{FlowBlockHandler, FlowExecutionInput, FlowExecutionState, FlowStepResult};

type HandlerResult = Result<FlowStepResult, HandlerError>;

/// Webhook connect and overall request timeout.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

fn device_failure(block: &FlowBlock, err: DeviceError) -> FlowStepResult {
    warn!(block_id = %block.id, error = %err, "device call failed");
    FlowStepResult::failed(block, err.to_string())
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

/// Shows a notification.  `title` and `message` may reference state
/// variables as `{{name}}`.
pub struct NotificationHandler {
    device: Arc<dyn Device>,
}

impl NotificationHandler {
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self { device }
    }
}

#[async_trait]
impl FlowBlockHandler for NotificationHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let title = state.interpolate(block.param("title").unwrap_or("Agent Automator"));
        let message = state.interpolate(block.param("message").unwrap_or("Automation executed."));
        Ok(match self.device.notify(&title, &message).await {
            Ok(()) => FlowStepResult::success(block, "Notification shown"),
            Err(e) => device_failure(block, e),
        })
    }
}

/// Sends a text message to `phone`.
pub struct SmsHandler {
    device: Arc<dyn Device>,
}

impl SmsHandler {
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self { device }
    }
}

#[async_trait]
impl FlowBlockHandler for SmsHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let Some(phone) = block.param("phone").filter(|p| !p.trim().is_empty()) else {
            return Ok(FlowStepResult::skipped(block, "Missing phone"));
        };
        let body = state.interpolate(block.param("body").unwrap_or("Automation triggered."));
        Ok(match self.device.send_sms(phone.trim(), &body).await {
            Ok(()) => FlowStepResult::success(block, "SMS sent"),
            Err(e) => device_failure(block, e),
        })
    }
}

// ---------------------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------------------

/// Calls `url` with `method` (POST) and an optional JSON `body`.
///
/// Any 2xx answer is SUCCESS; other statuses and transport errors are
/// FAILED.
#[derive(Debug, Clone)]
pub struct HttpWebhookHandler {
    client: reqwest::Client,
}

impl HttpWebhookHandler {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("intentflow/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(WEBHOOK_TIMEOUT)
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Use a preconfigured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpWebhookHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_method(method: &str) -> Option<reqwest::Method> {
    match method.trim().to_uppercase().as_str() {
        "GET" => Some(reqwest::Method::GET),
        "POST" => Some(reqwest::Method::POST),
        "PUT" => Some(reqwest::Method::PUT),
        "PATCH" => Some(reqwest::Method::PATCH),
        "DELETE" => Some(reqwest::Method::DELETE),
        _ => None,
    }
}

#[async_trait]
impl FlowBlockHandler for HttpWebhookHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let Some(raw_url) = block.param("url").filter(|u| !u.trim().is_empty()) else {
            return Ok(FlowStepResult::failed(block, "Missing URL"));
        };
        let url = match url::Url::parse(raw_url.trim()) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => u,
            Ok(u) => {
                return Ok(FlowStepResult::failed(
                    block,
                    format!("Unsupported URL scheme '{}'", u.scheme()),
                ));
            }
            Err(e) => return Ok(FlowStepResult::failed(block, format!("Invalid URL: {e}"))),
        };
        let method_text = block.param("method").unwrap_or("POST");
        let Some(method) = parse_method(method_text) else {
            return Ok(FlowStepResult::failed(
                block,
                format!("Unsupported method '{method_text}'"),
            ));
        };

        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = block.param("body").filter(|b| !b.is_empty()) {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(state.interpolate(body));
        }

        debug!(block_id = %block.id, %method, url = %url, "calling webhook");
        Ok(match request.send().await {
            Ok(resp) if resp.status().is_success() => {
                FlowStepResult::success(block, format!("Webhook {}", resp.status().as_u16()))
            }
            Ok(resp) => FlowStepResult::failed(block, format!("Webhook {}", resp.status().as_u16())),
            Err(e) => {
                warn!(block_id = %block.id, error = %e, "webhook request failed");
                FlowStepResult::failed(block, format!("Webhook failed: {e}"))
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Device settings
// ---------------------------------------------------------------------------

/// Switches wifi to `enable` (true).
pub struct ToggleWifiHandler {
    device: Arc<dyn Device>,
}

impl ToggleWifiHandler {
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self { device }
    }
}

#[async_trait]
impl FlowBlockHandler for ToggleWifiHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let enable = block
            .param("enable")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(true);
        Ok(match self.device.set_wifi(enable).await {
            Ok(()) => FlowStepResult::success(block, format!("Wi-Fi state set to {enable}")),
            Err(e) => device_failure(block, e),
        })
    }
}

/// Plays `uri`, or the default sound.
pub struct PlaySoundHandler {
    device: Arc<dyn Device>,
}

impl PlaySoundHandler {
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self { device }
    }
}

#[async_trait]
impl FlowBlockHandler for PlaySoundHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> HandlerResult {
        Ok(match self.device.play_sound(block.param("uri")).await {
            Ok(()) => FlowStepResult::success(block, "Sound played"),
            Err(e) => device_failure(block, e),
        })
    }
}

/// Sets an alarm at `hour`:`minute` with an optional `message`.
pub struct SetAlarmHandler {
    device: Arc<dyn Device>,
}

impl SetAlarmHandler {
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self { device }
    }
}

#[async_trait]
impl FlowBlockHandler for SetAlarmHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let hour = block.param("hour").and_then(|h| h.trim().parse::<u8>().ok()).filter(|h| *h < 24);
        let minute = block
            .param("minute")
            .and_then(|m| m.trim().parse::<u8>().ok())
            .filter(|m| *m < 60);
        let (Some(hour), Some(minute)) = (hour, minute) else {
            return Ok(FlowStepResult::failed(block, "Alarm needs hour 0-23 and minute 0-59"));
        };
        let message = block.param("message").unwrap_or("Alarm");
        Ok(match self.device.set_alarm(hour, minute, message).await {
            Ok(()) => FlowStepResult::success(block, format!("Alarm set for {hour:02}:{minute:02}")),
            Err(e) => device_failure(block, e),
        })
    }
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// Takes a photo with `lens` (front) and stores its path in `last_photo`.
pub struct CameraCaptureHandler {
    device: Arc<dyn Device>,
}

impl CameraCaptureHandler {
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self { device }
    }
}

#[async_trait]
impl FlowBlockHandler for CameraCaptureHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let lens = Lens::from_param(block.param("lens"));
        Ok(match self.device.capture_photo(lens).await {
            Ok(path) => {
                let message = format!("Photo saved: {path}");
                state.set("last_photo", path);
                FlowStepResult::success(block, message)
            }
            Err(e) => device_failure(block, e),
        })
    }
}

/// Reads the position with `accuracy` (balanced) and stores it in
/// `last_location`.
pub struct LocationHandler {
    device: Arc<dyn Device>,
}

impl LocationHandler {
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self { device }
    }
}

#[async_trait]
impl FlowBlockHandler for LocationHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let accuracy = Accuracy::from_param(block.param("accuracy"));
        Ok(match self.device.current_location(accuracy).await {
            Ok(location) => {
                let message = format!("Location found: {location}");
                state.set("last_location", location);
                FlowStepResult::success(block, message)
            }
            Err(e) => device_failure(block, e),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::StepStatus;
    use crate::handlers::test_support::RecordingDevice;
    use intentflow_graph::BlockType;

    fn recording() -> (Arc<RecordingDevice>, Arc<dyn Device>) {
        let device = Arc::new(RecordingDevice::default());
        let dyn_device: Arc<dyn Device> = device.clone();
        (device, dyn_device)
    }

    async fn run(handler: &dyn FlowBlockHandler, block: &FlowBlock, state: &mut FlowExecutionState) -> FlowStepResult {
        handler
            .handle(block, &FlowExecutionInput::new(), state)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn notification_defaults_and_interpolation() {
        let (rec, device) = recording();
        let handler = NotificationHandler::new(device);
        let mut state = FlowExecutionState::new();

        let plain = FlowBlock::new("n", BlockType::SendNotificationAction);
        assert_eq!(run(&handler, &plain, &mut state).await.message, "Notification shown");

        state.set("last_photo", "a.jpg");
        let templated = FlowBlock::new("n2", BlockType::SendNotificationAction)
            .with_param("title", "Alert")
            .with_param("message", "Saved {{last_photo}}");
        run(&handler, &templated, &mut state).await;

        let calls = rec.calls.lock().unwrap();
        assert_eq!(calls[0], "notify Agent Automator|Automation executed.");
        assert_eq!(calls[1], "notify Alert|Saved a.jpg");
    }

    #[tokio::test]
    async fn sms_requires_phone() {
        let (rec, device) = recording();
        let handler = SmsHandler::new(device);
        let mut state = FlowExecutionState::new();

        let r = run(&handler, &FlowBlock::new("s", BlockType::SendSmsAction), &mut state).await;
        assert_eq!((r.status, r.message.as_str()), (StepStatus::Skipped, "Missing phone"));

        let block = FlowBlock::new("s", BlockType::SendSmsAction).with_param("phone", "+1555");
        let r = run(&handler, &block, &mut state).await;
        assert_eq!((r.status, r.message.as_str()), (StepStatus::Success, "SMS sent"));
        assert_eq!(rec.calls.lock().unwrap()[0], "sms +1555|Automation triggered.");
    }

    #[tokio::test]
    async fn device_errors_become_failed_steps() {
        let device: Arc<dyn Device> = Arc::new(RecordingDevice::failing());
        let mut state = FlowExecutionState::new();
        let r = run(&PlaySoundHandler::new(device.clone()), &FlowBlock::new("p", BlockType::PlaySoundAction), &mut state).await;
        assert_eq!(r.status, StepStatus::Failed);
        assert_eq!(r.message, "test is unavailable");

        let r = run(&CameraCaptureHandler::new(device), &FlowBlock::new("c", BlockType::Camera), &mut state).await;
        assert_eq!(r.status, StepStatus::Failed);
        assert!(state.get("last_photo").is_none());
    }

    #[tokio::test]
    async fn camera_and_location_store_state() {
        let (_rec, device) = recording();
        let mut state = FlowExecutionState::new();

        let cam = FlowBlock::new("c", BlockType::Camera).with_param("lens", "back");
        let r = run(&CameraCaptureHandler::new(device.clone()), &cam, &mut state).await;
        assert_eq!(r.message, "Photo saved: back.jpg");
        assert_eq!(state.get("last_photo"), Some("back.jpg"));

        let loc = FlowBlock::new("l", BlockType::Location);
        run(&LocationHandler::new(device), &loc, &mut state).await;
        assert_eq!(state.get("last_location"), Some("1.5,2.5"));
    }

    #[tokio::test]
    async fn wifi_defaults_to_on() {
        let (rec, device) = recording();
        let handler = ToggleWifiHandler::new(device);
        let mut state = FlowExecutionState::new();
        run(&handler, &FlowBlock::new("w", BlockType::ToggleWifiAction), &mut state).await;
        let off = FlowBlock::new("w", BlockType::ToggleWifiAction).with_param("enable", "false");
        let r = run(&handler, &off, &mut state).await;
        assert_eq!(r.message, "Wi-Fi state set to false");
        assert_eq!(*rec.calls.lock().unwrap(), ["wifi true", "wifi false"]);
    }

    #[tokio::test]
    async fn alarm_validates_time() {
        let (rec, device) = recording();
        let handler = SetAlarmHandler::new(device);
        let mut state = FlowExecutionState::new();

        let bad = FlowBlock::new("a", BlockType::SetAlarmAction).with_param("hour", "24").with_param("minute", "0");
        assert_eq!(run(&handler, &bad, &mut state).await.status, StepStatus::Failed);

        let good = FlowBlock::new("a", BlockType::SetAlarmAction)
            .with_param("hour", "7")
            .with_param("minute", "30")
            .with_param("message", "Wake Up");
        let r = run(&handler, &good, &mut state).await;
        assert_eq!(r.message, "Alarm set for 07:30");
        assert_eq!(rec.calls.lock().unwrap()[0], "alarm 07:30|Wake Up");
    }

    #[tokio::test]
    async fn webhook_rejects_bad_params_without_network() {
        let handler = HttpWebhookHandler::new();
        let mut state = FlowExecutionState::new();

        let r = run(&handler, &FlowBlock::new("h", BlockType::HttpWebhookAction), &mut state).await;
        assert_eq!((r.status, r.message.as_str()), (StepStatus::Failed, "Missing URL"));

        let bad = FlowBlock::new("h", BlockType::HttpWebhookAction).with_param("url", "not a url");
        assert!(run(&handler, &bad, &mut state).await.message.starts_with("Invalid URL"));

        let ftp = FlowBlock::new("h", BlockType::HttpWebhookAction).with_param("url", "ftp://example.com");
        assert_eq!(run(&handler, &ftp, &mut state).await.message, "Unsupported URL scheme 'ftp'");

        let verb = FlowBlock::new("h", BlockType::HttpWebhookAction)
            .with_param("url", "http://example.com")
            .with_param("method", "BREW");
        assert_eq!(run(&handler, &verb, &mut state).await.message, "Unsupported method 'BREW'");
    }

    #[tokio::test]
    async fn webhook_transport_error_is_failed_step() {
        let handler = HttpWebhookHandler::new();
        let block = FlowBlock::new("h", BlockType::HttpWebhookAction).with_param("url", "http://127.0.0.1:9/hook");
        let r = run(&handler, &block, &mut FlowExecutionState::new()).await;
        assert_eq!(r.status, StepStatus::Failed);
        assert!(r.message.starts_with("Webhook failed"));
    }
}
