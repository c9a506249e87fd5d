//! Permission rules over server roles and channel visibility.

use crate::domain::entities::{Channel, MemberRole};

/// Domain service for role-based permission decisions.
///
/// Pure functions only; callers resolve memberships from storage first.
pub struct PermissionService;

impl PermissionService {
    /// Only the owner may create channels and categories or manage private
    /// channel membership.
    pub fn can_manage_channels(role: Option<MemberRole>) -> bool {
        matches!(role, Some(MemberRole::Owner))
    }

    /// Owners and admins may remove other users' messages.
    pub fn can_moderate_messages(role: Option<MemberRole>) -> bool {
        matches!(role, Some(MemberRole::Owner | MemberRole::Admin))
    }

    /// Visibility of a channel for a user.
    ///
    /// `is_channel_member` is only meaningful for private channels.
    pub fn can_view_channel(channel: &Channel, is_server_member: bool, is_channel_member: bool) -> bool {
        if !is_server_member {
            return false;
        }
        !channel.is_private || is_channel_member
    }

    /// Authors may always delete their own messages; otherwise moderation
    /// rights are required.
    pub fn can_delete_message(is_author: bool, role: Option<MemberRole>) -> bool {
        is_author || Self::can_moderate_messages(role)
    }
}
