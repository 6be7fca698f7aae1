//! Outbound message model and Cloud API wire format

use serde::Serialize;

/// A message addressed to one WhatsApp user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient_id: String,
    pub body: MessageBody,
}

/// Kind-specific message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text {
        body: String,
    },
    /// Interactive prompt asking the user to share a location
    LocationRequest {
        body: String,
    },
    /// Interactive message opening the business catalog
    Catalog {
        body: String,
        footer: Option<String>,
        thumbnail_product_id: Option<String>,
    },
    /// Interactive message with quick-reply buttons
    Buttons {
        body: String,
        footer: Option<String>,
        buttons: Vec<ReplyButton>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyButton {
    pub id: String,
    pub title: String,
}

impl ReplyButton {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    LocationRequest,
    Catalog,
    Buttons,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::LocationRequest => "interactive-location-request",
            MessageKind::Catalog => "interactive-catalog",
            MessageKind::Buttons => "interactive-buttons",
        }
    }
}

impl OutboundMessage {
    pub fn text(recipient_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            body: MessageBody::Text { body: body.into() },
        }
    }

    pub fn location_request(recipient_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            body: MessageBody::LocationRequest { body: body.into() },
        }
    }

    pub fn catalog(
        recipient_id: impl Into<String>,
        body: impl Into<String>,
        footer: Option<String>,
        thumbnail_product_id: Option<String>,
    ) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            body: MessageBody::Catalog {
                body: body.into(),
                footer,
                thumbnail_product_id,
            },
        }
    }

    pub fn buttons(
        recipient_id: impl Into<String>,
        body: impl Into<String>,
        footer: Option<String>,
        buttons: Vec<ReplyButton>,
    ) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            body: MessageBody::Buttons {
                body: body.into(),
                footer,
                buttons,
            },
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self.body {
            MessageBody::Text { .. } => MessageKind::Text,
            MessageBody::LocationRequest { .. } => MessageKind::LocationRequest,
            MessageBody::Catalog { .. } => MessageKind::Catalog,
            MessageBody::Buttons { .. } => MessageKind::Buttons,
        }
    }

    /// Main body text regardless of kind
    pub fn body_text(&self) -> &str {
        match &self.body {
            MessageBody::Text { body }
            | MessageBody::LocationRequest { body }
            | MessageBody::Catalog { body, .. }
            | MessageBody::Buttons { body, .. } => body,
        }
    }

    /// Build the `/messages` request body
    pub fn to_wire(&self) -> WireMessage<'_> {
        let to = self.recipient_id.as_str();
        match &self.body {
            MessageBody::Text { body } => WireMessage::new(to, "text").with_text(WireText {
                body,
                preview_url: false,
            }),
            MessageBody::LocationRequest { body } => {
                WireMessage::new(to, "interactive").with_interactive(WireInteractive {
                    interactive_type: "location_request_message",
                    body: WireBodyText { text: body },
                    footer: None,
                    action: WireAction::Named {
                        name: "send_location",
                        parameters: None,
                    },
                })
            }
            MessageBody::Catalog {
                body,
                footer,
                thumbnail_product_id,
            } => WireMessage::new(to, "interactive").with_interactive(WireInteractive {
                interactive_type: "catalog_message",
                body: WireBodyText { text: body },
                footer: footer.as_deref().map(|text| WireBodyText { text }),
                action: WireAction::Named {
                    name: "catalog_message",
                    parameters: thumbnail_product_id.as_deref().map(|id| CatalogParameters {
                        thumbnail_product_retailer_id: id,
                    }),
                },
            }),
            MessageBody::Buttons {
                body,
                footer,
                buttons,
            } => WireMessage::new(to, "interactive").with_interactive(WireInteractive {
                interactive_type: "button",
                body: WireBodyText { text: body },
                footer: footer.as_deref().map(|text| WireBodyText { text }),
                action: WireAction::Buttons {
                    buttons: buttons
                        .iter()
                        .map(|button| WireButton {
                            button_type: "reply",
                            reply: WireReply {
                                id: &button.id,
                                title: &button.title,
                            },
                        })
                        .collect(),
                },
            }),
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct WireMessage<'a> {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<WireText<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interactive: Option<WireInteractive<'a>>,
}

impl<'a> WireMessage<'a> {
    fn new(to: &'a str, message_type: &'static str) -> Self {
        Self {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to,
            message_type,
            text: None,
            interactive: None,
        }
    }

    fn with_text(mut self, text: WireText<'a>) -> Self {
        self.text = Some(text);
        self
    }

    fn with_interactive(mut self, interactive: WireInteractive<'a>) -> Self {
        self.interactive = Some(interactive);
        self
    }
}

#[derive(Debug, Serialize)]
struct WireText<'a> {
    body: &'a str,
    preview_url: bool,
}

#[derive(Debug, Serialize)]
struct WireInteractive<'a> {
    #[serde(rename = "type")]
    interactive_type: &'static str,
    body: WireBodyText<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<WireBodyText<'a>>,
    action: WireAction<'a>,
}

#[derive(Debug, Serialize)]
struct WireBodyText<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireAction<'a> {
    Named {
        name: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        parameters: Option<CatalogParameters<'a>>,
    },
    Buttons {
        buttons: Vec<WireButton<'a>>,
    },
}

#[derive(Debug, Serialize)]
struct CatalogParameters<'a> {
    thumbnail_product_retailer_id: &'a str,
}

#[derive(Debug, Serialize)]
struct WireButton<'a> {
    #[serde(rename = "type")]
    button_type: &'static str,
    reply: WireReply<'a>,
}

#[derive(Debug, Serialize)]
struct WireReply<'a> {
    id: &'a str,
    title: &'a str,
}
