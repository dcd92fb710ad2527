/// Status of a user in the gating channel, as reported by `getChatMember`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
    /// A status string this build does not know about.
    Other(String),
}

impl MembershipStatus {
    pub fn from_api(status: &str) -> Self {
        match status {
            "creator" => MembershipStatus::Creator,
            "administrator" => MembershipStatus::Administrator,
            "member" => MembershipStatus::Member,
            "restricted" => MembershipStatus::Restricted,
            "left" => MembershipStatus::Left,
            "kicked" => MembershipStatus::Kicked,
            other => MembershipStatus::Other(other.to_string()),
        }
    }

    /// Only full members, admins and the owner count as subscribed.
    pub fn is_subscribed(&self) -> bool {
        match self {
            MembershipStatus::Creator
            | MembershipStatus::Administrator
            | MembershipStatus::Member => true,
            MembershipStatus::Restricted
            | MembershipStatus::Left
            | MembershipStatus::Kicked
            | MembershipStatus::Other(_) => false,
        }
    }
}
