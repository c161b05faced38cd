use crate::{
    domain::{
        AdminMember, Item, ItemId, Member, MemberId, MemberRole, NewMember, PreferenceId,
        PreferenceItem, PreferenceSummary,
    },
    ports::{
        member::{self, MemberPort},
        preference::{self, PreferencePort},
    },
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, PoisonError},
};

#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    members: BTreeMap<MemberId, Member>,
    admins: HashMap<MemberId, AdminMember>,
    items: HashMap<ItemId, Item>,
    /// Ordered by id, which is also insertion order
    preferences: BTreeMap<PreferenceId, PreferenceItem>,
    sequence: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.sequence += 1;
        self.sequence
    }

    fn member_mut(&mut self, member_id: MemberId) -> Result<&mut Member, member::Error> {
        self.members
            .get_mut(&member_id)
            .ok_or(member::Error::MemberDoesNotExist(member_id))
    }

    fn find_member(&self, predicate: impl Fn(&Member) -> bool) -> Option<Member> {
        self.members.values().find(|m| predicate(m)).cloned()
    }
}

impl MemoryDatabase {
    /// Seed an item into the catalogue
    ///
    /// Items are owned by the catalogue, so there is no port operation to create them.
    pub fn insert_item(&self, item: Item) -> Result<(), preference::Error> {
        self.tables.lock()?.items.insert(item.id, item);
        Ok(())
    }

    /// Delete a member together with everything it owns
    pub fn delete_member(&self, member_id: MemberId) -> Result<(), member::Error> {
        let mut tables = self.tables.lock()?;
        tables
            .members
            .remove(&member_id)
            .ok_or(member::Error::MemberDoesNotExist(member_id))?;
        tables.admins.remove(&member_id);

        let owned: Vec<PreferenceItem> = tables
            .preferences
            .values()
            .filter(|p| p.member_id == member_id)
            .cloned()
            .collect();
        for preference in owned {
            tables.preferences.remove(&preference.id);
            if let Some(item) = tables.items.get_mut(&preference.item_id) {
                item.preference_count -= 1;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MemberPort for MemoryDatabase {
    async fn exists_by_id(&self, member_id: MemberId) -> Result<bool, member::Error> {
        Ok(self.tables.lock()?.members.contains_key(&member_id))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, member::Error> {
        Ok(self.tables.lock()?.find_member(|m| m.email == email).is_some())
    }

    async fn exists_by_phone(&self, phone: &str) -> Result<bool, member::Error> {
        Ok(self.tables.lock()?.find_member(|m| m.phone == phone).is_some())
    }

    async fn find_by_id(&self, member_id: MemberId) -> Result<Option<Member>, member::Error> {
        Ok(self.tables.lock()?.members.get(&member_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, member::Error> {
        Ok(self.tables.lock()?.find_member(|m| m.email == email))
    }

    async fn find_by_name_and_phone(
        &self,
        name: &str,
        phone: &str,
    ) -> Result<Option<Member>, member::Error> {
        Ok(self
            .tables
            .lock()?
            .find_member(|m| m.name == name && m.phone == phone))
    }

    async fn find_by_email_and_name_and_phone(
        &self,
        email: &str,
        name: &str,
        phone: &str,
    ) -> Result<Option<Member>, member::Error> {
        Ok(self
            .tables
            .lock()?
            .find_member(|m| m.email == email && m.name == name && m.phone == phone))
    }

    async fn find_admin_by_member_id(
        &self,
        member_id: MemberId,
    ) -> Result<Option<AdminMember>, member::Error> {
        Ok(self.tables.lock()?.admins.get(&member_id).cloned())
    }

    async fn insert(&self, new_member: NewMember) -> Result<Member, member::Error> {
        let mut tables = self.tables.lock()?;
        // Same uniqueness constraints as the relational schema
        if tables.find_member(|m| m.email == new_member.email).is_some() {
            return Err(member::Error::DuplicateEmail(new_member.email));
        }
        if tables.find_member(|m| m.phone == new_member.phone).is_some() {
            return Err(member::Error::DuplicatePhone(new_member.phone));
        }

        let member = new_member.into_member(tables.next_id());
        if member.role == MemberRole::Admin {
            let admin = AdminMember {
                id: tables.next_id(),
                member_id: member.id,
            };
            tables.admins.insert(member.id, admin);
        }
        tables.members.insert(member.id, member.clone());

        Ok(member)
    }

    async fn update_password(
        &self,
        member_id: MemberId,
        password_hash: &str,
    ) -> Result<(), member::Error> {
        self.tables.lock()?.member_mut(member_id)?.password = password_hash.to_string();
        Ok(())
    }

    async fn update_address(&self, member_id: MemberId, address: &str) -> Result<(), member::Error> {
        self.tables.lock()?.member_mut(member_id)?.address = Some(address.to_string());
        Ok(())
    }

    async fn change_point(&self, member_id: MemberId, delta_points: i32) -> Result<i32, member::Error> {
        let mut tables = self.tables.lock()?;
        let member = tables.member_mut(member_id)?;
        let Some(new_points) = member.point.checked_add(delta_points) else {
            return Err(member::Error::PointsOverflow {
                current_points: member.point,
                delta_points,
            });
        };
        // Return an error if this would make the point balance negative
        if new_points < 0 {
            return Err(member::Error::NegativePointsTotal {
                current_points: member.point,
                delta_points,
            });
        }
        member.point = new_points;
        Ok(new_points)
    }
}

#[async_trait::async_trait]
impl PreferencePort for MemoryDatabase {
    async fn find_item(&self, item_id: ItemId) -> Result<Option<Item>, preference::Error> {
        Ok(self.tables.lock()?.items.get(&item_id).cloned())
    }

    async fn find_preference(
        &self,
        preference_id: PreferenceId,
    ) -> Result<Option<PreferenceItem>, preference::Error> {
        Ok(self.tables.lock()?.preferences.get(&preference_id).cloned())
    }

    async fn find_summaries_by_member_id(
        &self,
        member_id: MemberId,
    ) -> Result<Vec<PreferenceSummary>, preference::Error> {
        let tables = self.tables.lock()?;
        let summaries = tables
            .preferences
            .values()
            .filter(|p| p.member_id == member_id)
            .filter_map(|p| {
                tables
                    .items
                    .get(&p.item_id)
                    .map(|item| PreferenceSummary::new(p, item))
            })
            .collect();
        Ok(summaries)
    }

    async fn add(
        &self,
        member_id: MemberId,
        item_id: ItemId,
    ) -> Result<PreferenceItem, preference::Error> {
        let mut tables = self.tables.lock()?;
        let id = tables.next_id();
        let item = tables
            .items
            .get_mut(&item_id)
            .ok_or(preference::Error::ItemDoesNotExist(item_id))?;
        item.preference_count += 1;

        let preference = PreferenceItem {
            id,
            member_id,
            item_id,
        };
        tables.preferences.insert(id, preference.clone());
        Ok(preference)
    }

    async fn remove(&self, preference_id: PreferenceId) -> Result<(), preference::Error> {
        let mut tables = self.tables.lock()?;
        let preference = tables
            .preferences
            .remove(&preference_id)
            .ok_or(preference::Error::PreferenceDoesNotExist(preference_id))?;
        if let Some(item) = tables.items.get_mut(&preference.item_id) {
            item.preference_count -= 1;
        }
        Ok(())
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for member::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for preference::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}
