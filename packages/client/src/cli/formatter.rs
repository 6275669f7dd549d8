//! Message formatting utilities for client display.

use palaver_shared::time::timestamp_to_local_clock;

use crate::{
    domain::{ActiveUser, ChatMessage, Endpoint},
    error::SessionError,
};

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner shown once the session is connected
    pub fn format_connected(endpoint: &Endpoint, name: &str) -> String {
        format!(
            "\nConnected to {} as '{}'. Type messages and press Enter to send. \
             Type /quit or press Ctrl+C to exit.\n",
            endpoint, name
        )
    }

    /// Format the active-user snapshot, marking the current user as "(me)"
    pub fn format_user_list(users: &[ActiveUser], current_name: &str) -> String {
        let mut output = String::new();
        output.push_str("\n\n");
        output.push_str(RULE);
        output.push_str("\nActive users:\n");

        if users.is_empty() {
            output.push_str("(No users)\n");
        } else {
            for user in users {
                let me_suffix = if user.name == current_name { " (me)" } else { "" };
                output.push_str(&format!("[{}] {}{}\n", user.avatar_label, user.name, me_suffix));
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format a user-joined notification
    pub fn format_user_joined(name: &str) -> String {
        format!("\n+ {} joined the chat\n", name)
    }

    /// Format a chat message; the current user's own messages are marked
    pub fn format_chat_message(message: &ChatMessage, current_name: &str) -> String {
        let me_suffix = if message.sender_name == current_name {
            " (me)"
        } else {
            ""
        };
        format!(
            "\n[{}] @{}{}: {}\n",
            timestamp_to_local_clock(message.received_at),
            message.sender_name,
            me_suffix,
            message.text
        )
    }

    /// Format a transport error
    pub fn format_error(error: &SessionError) -> String {
        format!("\n! {}\n", error)
    }

    /// Format the disconnection notice
    pub fn format_disconnected() -> String {
        "\n- Disconnected from server\n".to_string()
    }
}
