//! Wish-list entries owned by a member

use std::task::{Context, Poll};

use tower::Service;
use tracing::{info, warn};

use crate::{
    domain::{ItemId, MemberId, PreferenceId, PreferenceSummary},
    ports::{
        member::MemberPort, password::PasswordPort, preference::PreferencePort, token::TokenPort,
    },
};

use super::{BoxFuture, DomainLogic, Error};

pub struct AddPreferenceRequest {
    pub member_id: MemberId,
    pub item_id: ItemId,
}

/// Preferences owned by a member, oldest first
pub struct ListPreferences(pub MemberId);

pub struct DeletePreferenceRequest {
    /// Member asking for the deletion, must own the preference
    pub member_id: MemberId,
    pub preference_id: PreferenceId,
}

impl<M, P, H, T> Service<AddPreferenceRequest> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = PreferenceId;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: AddPreferenceRequest) -> Self::Future {
        let member = self.member.clone();
        let preference = self.preference.clone();
        Box::pin(async move {
            if !member.exists_by_id(req.member_id).await? {
                return Err(Error::MemberNotFound(req.member_id));
            }
            if preference.find_item(req.item_id).await?.is_none() {
                return Err(Error::ItemNotFound(req.item_id));
            }

            let saved = preference.add(req.member_id, req.item_id).await?;
            info!(
                member_id = saved.member_id,
                item_id = saved.item_id,
                preference_id = saved.id,
                "preference added"
            );
            Ok(saved.id)
        })
    }
}

impl<M, P, H, T> Service<ListPreferences> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = Vec<PreferenceSummary>;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ListPreferences) -> Self::Future {
        let member = self.member.clone();
        let preference = self.preference.clone();
        Box::pin(async move {
            if !member.exists_by_id(req.0).await? {
                return Err(Error::MemberNotFound(req.0));
            }
            Ok(preference.find_summaries_by_member_id(req.0).await?)
        })
    }
}

impl<M, P, H, T> Service<DeletePreferenceRequest> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = ();
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DeletePreferenceRequest) -> Self::Future {
        let preference = self.preference.clone();
        Box::pin(async move {
            let found = preference
                .find_preference(req.preference_id)
                .await?
                .ok_or(Error::PreferenceNotFound(req.preference_id))?;

            if !found.is_owned_by(req.member_id) {
                warn!(
                    member_id = req.member_id,
                    owner_id = found.member_id,
                    preference_id = found.id,
                    "preference deletion rejected: not the owner"
                );
                return Err(Error::NotPreferenceOwner {
                    member_id: req.member_id,
                    preference_id: found.id,
                });
            }

            preference.remove(found.id).await?;
            info!(
                member_id = req.member_id,
                preference_id = found.id,
                "preference deleted"
            );
            Ok(())
        })
    }
}
