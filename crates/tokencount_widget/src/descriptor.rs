/// Registration metadata handed to the host's status-bar factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
}

pub const DESCRIPTOR: WidgetDescriptor = WidgetDescriptor {
    id: "TokenCountAIWidget",
    display_name: "Token Count AI",
};

impl WidgetDescriptor {
    /// The widget works in every project.
    pub fn is_available(&self) -> bool {
        true
    }

    /// The widget can be enabled on any status bar.
    pub fn can_be_enabled(&self) -> bool {
        true
    }
}
