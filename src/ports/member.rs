use crate::domain::{AdminMember, Member, MemberId, NewMember};

/// Persistence boundary for members and their admin records
#[mockall::automock]
#[async_trait::async_trait]
pub trait MemberPort: Send + Sync {
    async fn exists_by_id(&self, member_id: MemberId) -> Result<bool, Error>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, Error>;
    async fn exists_by_phone(&self, phone: &str) -> Result<bool, Error>;

    async fn find_by_id(&self, member_id: MemberId) -> Result<Option<Member>, Error>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, Error>;
    async fn find_by_name_and_phone(&self, name: &str, phone: &str)
        -> Result<Option<Member>, Error>;
    async fn find_by_email_and_name_and_phone(
        &self,
        email: &str,
        name: &str,
        phone: &str,
    ) -> Result<Option<Member>, Error>;
    async fn find_admin_by_member_id(
        &self,
        member_id: MemberId,
    ) -> Result<Option<AdminMember>, Error>;

    /// Store a new member and return it with its generated id
    ///
    /// Members with the `ADMIN` role get their admin record in the same operation.
    async fn insert(&self, member: NewMember) -> Result<Member, Error>;
    /// Replace the stored password hash
    async fn update_password(&self, member_id: MemberId, password_hash: &str)
        -> Result<(), Error>;
    async fn update_address(&self, member_id: MemberId, address: &str) -> Result<(), Error>;
    /// Apply a signed delta to the point balance and return the new balance
    async fn change_point(&self, member_id: MemberId, delta_points: i32) -> Result<i32, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain-level error when a member does not exist
    #[error("member {0} does not exist")]
    MemberDoesNotExist(MemberId),

    /// Another member already uses this email
    #[error("email {0} is already registered")]
    DuplicateEmail(String),

    /// Another member already uses this phone number
    #[error("phone {0} is already registered")]
    DuplicatePhone(String),

    /// Trying to remove too many points
    ///
    /// This would result in a negative point balance, which is not supported.
    #[error("trying to subtract too many points: {delta_points} from {current_points}")]
    NegativePointsTotal {
        current_points: i32,
        delta_points: i32,
    },

    /// Adding points would go past the largest balance that can be stored
    #[error("trying to add too many points: {delta_points} to {current_points}")]
    PointsOverflow {
        current_points: i32,
        delta_points: i32,
    },

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
