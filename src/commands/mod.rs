use std::{future::Future, pin::Pin, sync::Arc};

use crate::{
    domain::{ItemId, MemberId, PreferenceId},
    ports::{member, password, preference, token},
};

pub mod change_password;
pub mod change_points;
pub mod duplicate;
pub mod login;
pub mod preference_items;
pub mod profile;
pub mod recovery;
pub mod signup;

/// Business rules over the ports
///
/// Every operation is a request type for which `DomainLogic` implements
/// [`tower::Service`]. Cloning only clones the `Arc`s, so callers can drive a fresh clone per
/// request.
pub struct DomainLogic<M: ?Sized, P: ?Sized, H: ?Sized, T: ?Sized> {
    member: Arc<M>,
    preference: Arc<P>,
    password: Arc<H>,
    token: Arc<T>,
}

impl<M: ?Sized, P: ?Sized, H: ?Sized, T: ?Sized> DomainLogic<M, P, H, T> {
    pub fn new(member: Arc<M>, preference: Arc<P>, password: Arc<H>, token: Arc<T>) -> Self {
        Self {
            member,
            preference,
            password,
            token,
        }
    }
}

impl<M: ?Sized, P: ?Sized, H: ?Sized, T: ?Sized> Clone for DomainLogic<M, P, H, T> {
    fn clone(&self) -> Self {
        Self {
            member: self.member.clone(),
            preference: self.preference.clone(),
            password: self.password.clone(),
            token: self.token.clone(),
        }
    }
}

pub type BoxFuture<R> = Pin<Box<dyn Future<Output = Result<R, Error>> + Send>>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("member port error: {0:?}")]
    Member(#[from] member::Error),
    #[error("preference port error: {0:?}")]
    Preference(#[from] preference::Error),
    #[error("password port error: {0:?}")]
    Password(#[from] password::Error),
    #[error("token port error: {0:?}")]
    Token(#[from] token::Error),

    #[error("member {0} not found")]
    MemberNotFound(MemberId),
    #[error("no member matches the given details")]
    NoMatchingMember,
    #[error("item {0} not found")]
    ItemNotFound(ItemId),
    #[error("preference {0} not found")]
    PreferenceNotFound(PreferenceId),
    #[error("member {0} is not an admin")]
    AdminNotFound(MemberId),

    #[error("email {0} is already registered")]
    DuplicateEmail(String),
    #[error("phone {0} is already registered")]
    DuplicatePhone(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("member {member_id} does not own preference {preference_id}")]
    NotPreferenceOwner {
        member_id: MemberId,
        preference_id: PreferenceId,
    },

    #[error("new password is the same as the current one")]
    SamePassword,
}

/// Coarse classification of an [`Error`], used to pick a response status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unauthorized,
    Forbidden,
    Validation,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MemberNotFound(_)
            | Error::NoMatchingMember
            | Error::ItemNotFound(_)
            | Error::PreferenceNotFound(_)
            | Error::AdminNotFound(_)
            | Error::Member(member::Error::MemberDoesNotExist(_))
            | Error::Preference(preference::Error::ItemDoesNotExist(_))
            | Error::Preference(preference::Error::PreferenceDoesNotExist(_)) => {
                ErrorKind::NotFound
            }
            Error::DuplicateEmail(_)
            | Error::DuplicatePhone(_)
            | Error::Member(member::Error::DuplicateEmail(_))
            | Error::Member(member::Error::DuplicatePhone(_)) => ErrorKind::Conflict,
            Error::InvalidCredentials => ErrorKind::Unauthorized,
            Error::NotPreferenceOwner { .. } => ErrorKind::Forbidden,
            Error::SamePassword
            | Error::Member(member::Error::NegativePointsTotal { .. })
            | Error::Member(member::Error::PointsOverflow { .. }) => ErrorKind::Validation,
            Error::Member(member::Error::Adapter(_))
            | Error::Preference(preference::Error::Adapter(_))
            | Error::Password(_)
            | Error::Token(_) => ErrorKind::Internal,
        }
    }

    /// Stable code reported to API clients
    pub fn code(&self) -> &'static str {
        match self {
            Error::MemberNotFound(_)
            | Error::NoMatchingMember
            | Error::Member(member::Error::MemberDoesNotExist(_)) => "NO_FIND_MEMBER",
            Error::ItemNotFound(_) | Error::Preference(preference::Error::ItemDoesNotExist(_)) => {
                "NO_FIND_ITEM_BY_ID"
            }
            Error::PreferenceNotFound(_)
            | Error::Preference(preference::Error::PreferenceDoesNotExist(_)) => {
                "NO_FIND_PREFERENCE"
            }
            Error::AdminNotFound(_) => "NOT_ADMIN_MEMBER",
            Error::DuplicateEmail(_) | Error::Member(member::Error::DuplicateEmail(_)) => {
                "DUPLICATE_EMAIL"
            }
            Error::DuplicatePhone(_) | Error::Member(member::Error::DuplicatePhone(_)) => {
                "DUPLICATE_PHONE"
            }
            Error::InvalidCredentials => "INVALID_CREDENTIALS",
            Error::NotPreferenceOwner { .. } => "NOT_AUTHORITY_PREFERENCE_EDIT",
            Error::SamePassword => "SAME_PASSWORD",
            Error::Member(member::Error::NegativePointsTotal { .. }) => "NEGATIVE_POINTS",
            Error::Member(member::Error::PointsOverflow { .. }) => "POINTS_OVERFLOW",
            Error::Member(member::Error::Adapter(_))
            | Error::Preference(preference::Error::Adapter(_))
            | Error::Password(_)
            | Error::Token(_) => "INTERNAL_ERROR",
        }
    }
}
