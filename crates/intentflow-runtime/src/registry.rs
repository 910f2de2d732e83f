//! Block type to handler mapping.
//!
//! The embedding application builds a registry (usually via
//! [`HandlerRegistry::standard`]) and hands it to the engine.  Types without
//! a handler are silently skipped during execution.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use intentflow_graph::BlockType;

use crate::device::Device;
use crate::handler::FlowBlockHandler;
use crate::handlers::{
    ActivityRecognitionHandler, BatteryGuardHandler, BatteryLevelHandler, BranchSelectorHandler,
    CameraCaptureHandler, ContextMatchHandler, DelayHandler, HttpWebhookHandler, LocationHandler,
    NotificationHandler, PedometerHandler, PlaySoundHandler, SetAlarmHandler, SmsHandler,
    TimeWindowConditionHandler, ToggleWifiHandler, TriggerHandler, VariableHandler,
};

/// Maps each supported block type to its handler.
///
/// Cheap to clone; handlers are shared.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<BlockType, Arc<dyn FlowBlockHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// One handler for every catalog type, with side effects on `device`.
    pub fn standard(device: Arc<dyn Device>) -> Self {
        let variables: Arc<dyn FlowBlockHandler> = Arc::new(VariableHandler);
        Self::new()
            .with(BlockType::LocationExitTrigger, TriggerHandler::new("Location exit detected"))
            .with(BlockType::TimeScheduleTrigger, TriggerHandler::new("Scheduled trigger fired"))
            .with(BlockType::ManualQuickTrigger, TriggerHandler::new("Manual trigger fired"))
            .with(BlockType::TimeWindowCondition, TimeWindowConditionHandler)
            .with(BlockType::BatteryGuardCondition, BatteryGuardHandler)
            .with(BlockType::ContextMatchCondition, ContextMatchHandler)
            .with(BlockType::BatteryLevelCondition, BatteryLevelHandler)
            .with(BlockType::Pedometer, PedometerHandler)
            .with(BlockType::ActivityRecognition, ActivityRecognitionHandler)
            .with(BlockType::SendNotificationAction, NotificationHandler::new(device.clone()))
            .with(BlockType::SendSmsAction, SmsHandler::new(device.clone()))
            .with(BlockType::HttpWebhookAction, HttpWebhookHandler::new())
            .with(BlockType::ToggleWifiAction, ToggleWifiHandler::new(device.clone()))
            .with(BlockType::PlaySoundAction, PlaySoundHandler::new(device.clone()))
            .with(BlockType::SetAlarmAction, SetAlarmHandler::new(device.clone()))
            .with(BlockType::Camera, CameraCaptureHandler::new(device.clone()))
            .with(BlockType::Location, LocationHandler::new(device))
            .with(BlockType::DelayAction, DelayHandler)
            .with_shared(BlockType::SetVariableAction, variables.clone())
            .with_shared(BlockType::GetVariableBlock, variables)
            .with(BlockType::BranchSelector, BranchSelectorHandler)
    }

    /// Register `handler` for `block_type`, replacing any previous one.
    pub fn register(&mut self, block_type: BlockType, handler: Arc<dyn FlowBlockHandler>) {
        debug!(%block_type, "handler registered");
        self.handlers.insert(block_type, handler);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, block_type: BlockType, handler: impl FlowBlockHandler + 'static) -> Self {
        self.register(block_type, Arc::new(handler));
        self
    }

    /// Builder-style registration of an already shared handler.
    pub fn with_shared(mut self, block_type: BlockType, handler: Arc<dyn FlowBlockHandler>) -> Self {
        self.register(block_type, handler);
        self
    }

    /// Remove the handler for `block_type`.
    pub fn unregister(&mut self, block_type: BlockType) -> Option<Arc<dyn FlowBlockHandler>> {
        self.handlers.remove(&block_type)
    }

    pub fn get(&self, block_type: BlockType) -> Option<&Arc<dyn FlowBlockHandler>> {
        self.handlers.get(&block_type)
    }

    pub fn contains(&self, block_type: BlockType) -> bool {
        self.handlers.contains_key(&block_type)
    }

    /// Registered types in catalog order.
    pub fn registered_types(&self) -> Vec<BlockType> {
        BlockType::ALL
            .into_iter()
            .filter(|t| self.handlers.contains_key(t))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}
