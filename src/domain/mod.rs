use std::fmt;

use serde::{Deserialize, Serialize};

pub mod password;

pub use password::TemporaryPassword;

/// Identifier of a `Member`, generated by the persistence layer
pub type MemberId = i64;
pub type ItemId = i64;
pub type PreferenceId = i64;

/// A registered user account
///
/// Collections owned by a member (cart items, orders, preferences, coupons, Q&A entries,
/// reviews) are rows keyed by `member_id` in storage and are not loaded on this value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub role: MemberRole,
    pub email: String,
    /// Password hash, never the plaintext
    pub password: String,
    pub name: String,
    /// Digits only, e.g. `01012345678`
    pub phone: String,
    /// Birth date as submitted at signup, e.g. `20000327`
    pub birth: String,
    pub address: Option<String>,
    /// Accrued points
    ///
    /// Only ever changed by a signed delta.
    pub point: i32,
    pub chance: i32,
}

impl Member {
    /// Read-only view of the member without the password hash
    pub fn info(&self) -> MemberInfo {
        MemberInfo {
            id: self.id,
            role: self.role,
            email: self.email.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            birth: self.birth.clone(),
            address: self.address.clone(),
            point: self.point,
        }
    }
}

/// Data needed to persist a new `Member`
///
/// Points and chances always start at zero, and the id is assigned on insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMember {
    pub role: MemberRole,
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub birth: String,
}

impl NewMember {
    pub fn into_member(self, id: MemberId) -> Member {
        Member {
            id,
            role: self.role,
            email: self.email,
            password: self.password,
            name: self.name,
            phone: self.phone,
            birth: self.birth,
            address: None,
            point: 0,
            chance: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    #[default]
    Bronze,
    Silver,
    Gold,
    Admin,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Bronze => "BRONZE",
            MemberRole::Silver => "SILVER",
            MemberRole::Gold => "GOLD",
            MemberRole::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown member role: {0}")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for MemberRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BRONZE" => Ok(MemberRole::Bronze),
            "SILVER" => Ok(MemberRole::Silver),
            "GOLD" => Ok(MemberRole::Gold),
            "ADMIN" => Ok(MemberRole::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Admin record linked to a `Member` with the `ADMIN` role
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminMember {
    pub id: i64,
    pub member_id: MemberId,
}

/// Read-only projection of a `Member`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub id: MemberId,
    pub role: MemberRole,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub birth: String,
    pub address: Option<String>,
    pub point: i32,
}

/// Catalogue item, as far as preferences are concerned
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: i32,
    pub sale: bool,
    /// Stored file name of the thumbnail image
    pub thumbnail: String,
    /// Number of members who wish-listed this item
    pub preference_count: i32,
}

/// Wish-list entry joining one member and one item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreferenceItem {
    pub id: PreferenceId,
    pub member_id: MemberId,
    pub item_id: ItemId,
}

impl PreferenceItem {
    pub fn is_owned_by(&self, member_id: MemberId) -> bool {
        self.member_id == member_id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSummary {
    pub thumbnail: String,
    pub name: String,
    pub price: i32,
    pub sale: bool,
    pub preference_id: PreferenceId,
}

impl PreferenceSummary {
    pub fn new(preference: &PreferenceItem, item: &Item) -> Self {
        Self {
            thumbnail: item.thumbnail.clone(),
            name: item.name.clone(),
            price: item.price,
            sale: item.sale,
            preference_id: preference.id,
        }
    }
}
