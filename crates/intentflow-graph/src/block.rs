//! The closed block type catalog.
//!
//! Every block in a flow graph carries one [`BlockType`], and every type has
//! a fixed [`BlockCategory`].  Adding a new capability means adding a variant
//! here; the validator, the synthesis prompt and the handler registry all
//! derive their view of the catalog from [`BlockType::ALL`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The role a block plays in a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockCategory {
    /// Entry point of a traversal.
    Trigger,
    /// Evaluates runtime signals and reports whether the flow should proceed.
    Condition,
    /// Performs a side effect on the device or the network.
    Action,
    /// Bookkeeping: delays, variables, branch labels.
    Utility,
}

impl fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger => write!(f, "TRIGGER"),
            Self::Condition => write!(f, "CONDITION"),
            Self::Action => write!(f, "ACTION"),
            Self::Utility => write!(f, "UTILITY"),
        }
    }
}

// ---------------------------------------------------------------------------
// Block type
// ---------------------------------------------------------------------------

/// A block type from the closed catalog.
///
/// On the wire a block type is its catalog name, e.g. `"ManualQuickTrigger"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockType {
    // -- Triggers -----------------------------------------------------------
    #[serde(rename = "LocationExitTrigger")]
    LocationExitTrigger,
    #[serde(rename = "TimeScheduleTrigger")]
    TimeScheduleTrigger,
    #[serde(rename = "ManualQuickTrigger")]
    ManualQuickTrigger,

    // -- Conditions ---------------------------------------------------------
    #[serde(rename = "TimeWindowCondition")]
    TimeWindowCondition,
    #[serde(rename = "BatteryGuardCondition")]
    BatteryGuardCondition,
    #[serde(rename = "ContextMatchCondition")]
    ContextMatchCondition,
    #[serde(rename = "BatteryLevelCondition")]
    BatteryLevelCondition,
    #[serde(rename = "Pedometer")]
    Pedometer,
    #[serde(rename = "ActivityRecognition")]
    ActivityRecognition,

    // -- Actions ------------------------------------------------------------
    #[serde(rename = "SendNotificationAction")]
    SendNotificationAction,
    #[serde(rename = "SendSMSAction")]
    SendSmsAction,
    #[serde(rename = "HttpWebhookAction")]
    HttpWebhookAction,
    #[serde(rename = "ToggleWifiAction")]
    ToggleWifiAction,
    #[serde(rename = "PlaySoundAction")]
    PlaySoundAction,
    #[serde(rename = "SetAlarmAction")]
    SetAlarmAction,
    #[serde(rename = "Camera")]
    Camera,
    #[serde(rename = "Location")]
    Location,

    // -- Utilities ----------------------------------------------------------
    #[serde(rename = "DelayAction")]
    DelayAction,
    #[serde(rename = "SetVariableAction")]
    SetVariableAction,
    #[serde(rename = "GetVariableBlock")]
    GetVariableBlock,
    #[serde(rename = "BranchSelector")]
    BranchSelector,
}

impl BlockType {
    /// Every catalog entry, grouped by category in declaration order.
    pub const ALL: [BlockType; 21] = [
        Self::LocationExitTrigger,
        Self::TimeScheduleTrigger,
        Self::ManualQuickTrigger,
        Self::TimeWindowCondition,
        Self::BatteryGuardCondition,
        Self::ContextMatchCondition,
        Self::BatteryLevelCondition,
        Self::Pedometer,
        Self::ActivityRecognition,
        Self::SendNotificationAction,
        Self::SendSmsAction,
        Self::HttpWebhookAction,
        Self::ToggleWifiAction,
        Self::PlaySoundAction,
        Self::SetAlarmAction,
        Self::Camera,
        Self::Location,
        Self::DelayAction,
        Self::SetVariableAction,
        Self::GetVariableBlock,
        Self::BranchSelector,
    ];

    /// The catalog name used on the wire.
    pub const fn name(self) -> &'static str {
        match self {
            Self::LocationExitTrigger => "LocationExitTrigger",
            Self::TimeScheduleTrigger => "TimeScheduleTrigger",
            Self::ManualQuickTrigger => "ManualQuickTrigger",
            Self::TimeWindowCondition => "TimeWindowCondition",
            Self::BatteryGuardCondition => "BatteryGuardCondition",
            Self::ContextMatchCondition => "ContextMatchCondition",
            Self::BatteryLevelCondition => "BatteryLevelCondition",
            Self::Pedometer => "Pedometer",
            Self::ActivityRecognition => "ActivityRecognition",
            Self::SendNotificationAction => "SendNotificationAction",
            Self::SendSmsAction => "SendSMSAction",
            Self::HttpWebhookAction => "HttpWebhookAction",
            Self::ToggleWifiAction => "ToggleWifiAction",
            Self::PlaySoundAction => "PlaySoundAction",
            Self::SetAlarmAction => "SetAlarmAction",
            Self::Camera => "Camera",
            Self::Location => "Location",
            Self::DelayAction => "DelayAction",
            Self::SetVariableAction => "SetVariableAction",
            Self::GetVariableBlock => "GetVariableBlock",
            Self::BranchSelector => "BranchSelector",
        }
    }

    /// The fixed category of this type.
    pub const fn category(self) -> BlockCategory {
        match self {
            Self::LocationExitTrigger | Self::TimeScheduleTrigger | Self::ManualQuickTrigger => {
                BlockCategory::Trigger
            }
            Self::TimeWindowCondition
            | Self::BatteryGuardCondition
            | Self::ContextMatchCondition
            | Self::BatteryLevelCondition
            | Self::Pedometer
            | Self::ActivityRecognition => BlockCategory::Condition,
            Self::SendNotificationAction
            | Self::SendSmsAction
            | Self::HttpWebhookAction
            | Self::ToggleWifiAction
            | Self::PlaySoundAction
            | Self::SetAlarmAction
            | Self::Camera
            | Self::Location => BlockCategory::Action,
            Self::DelayAction
            | Self::SetVariableAction
            | Self::GetVariableBlock
            | Self::BranchSelector => BlockCategory::Utility,
        }
    }

    /// Parameter conventions for this type, as shown to the text generator.
    ///
    /// Empty when the type takes no parameters.
    pub const fn param_hint(self) -> &'static str {
        match self {
            Self::LocationExitTrigger => "geofence, radiusMeters",
            Self::TimeScheduleTrigger => "time='HH:mm', days='[\"Mon\"]'",
            Self::ManualQuickTrigger => "",
            Self::TimeWindowCondition => "start='HH:mm', end='HH:mm'",
            Self::BatteryGuardCondition => "minPercent='15'",
            Self::ContextMatchCondition => "value='driving'",
            Self::BatteryLevelCondition => "minLevel='15', maxLevel='80'",
            Self::Pedometer => "threshold='10'",
            Self::ActivityRecognition => "type='STILL'|'WALKING'|'RUNNING', confidence='50'",
            Self::SendNotificationAction => "title, message",
            Self::SendSmsAction => "phone, body",
            Self::HttpWebhookAction => "url, method, body",
            Self::ToggleWifiAction => "enable='true'|'false'",
            Self::PlaySoundAction => "uri='content://media/internal/audio/media/1'",
            Self::SetAlarmAction => "hour='7', minute='30', message='Wake Up', skipUi='true'",
            Self::Camera => "lens='front'|'back'",
            Self::Location => "accuracy='high'|'balanced'|'low'",
            Self::DelayAction => "millis='1000'",
            Self::SetVariableAction => "key, value",
            Self::GetVariableBlock => "key",
            Self::BranchSelector => "route",
        }
    }

    /// Whether this type is an entry point.
    pub const fn is_trigger(self) -> bool {
        matches!(self.category(), BlockCategory::Trigger)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when text does not name a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown block type `{0}`")]
pub struct UnknownBlockType(pub String);

impl FromStr for BlockType {
    type Err = UnknownBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| UnknownBlockType(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
