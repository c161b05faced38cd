use crate::domain::{Item, ItemId, MemberId, PreferenceId, PreferenceItem, PreferenceSummary};

/// Persistence boundary for wish-list entries and the items they point to
#[mockall::automock]
#[async_trait::async_trait]
pub trait PreferencePort: Send + Sync {
    async fn find_item(&self, item_id: ItemId) -> Result<Option<Item>, Error>;
    async fn find_preference(&self, preference_id: PreferenceId)
        -> Result<Option<PreferenceItem>, Error>;
    /// Summaries of every preference owned by the member, oldest first
    async fn find_summaries_by_member_id(
        &self,
        member_id: MemberId,
    ) -> Result<Vec<PreferenceSummary>, Error>;

    /// Store a new preference and increment the item's preference counter
    ///
    /// Both changes are applied atomically.
    async fn add(&self, member_id: MemberId, item_id: ItemId) -> Result<PreferenceItem, Error>;
    /// Delete a preference and decrement the item's preference counter
    ///
    /// Both changes are applied atomically.
    async fn remove(&self, preference_id: PreferenceId) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("item {0} does not exist")]
    ItemDoesNotExist(ItemId),

    #[error("preference {0} does not exist")]
    PreferenceDoesNotExist(PreferenceId),

    /// Concrete adapter errors
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
