use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::{postgres::PgPoolOptions, PgPool};

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

/// Relational adapter backed by `PostgreSQL`
///
/// Multi-statement mutations run inside a single transaction, and counters are updated in
/// place by the database rather than read and written back.
#[derive(Clone, Debug)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a connection pool
    pub async fn connect(url: &SecretString, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url.expose_secret())
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the migrations under `migrations/`
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    member_id: i64,
    member_role: String,
    email: String,
    password: String,
    name: String,
    phone: String,
    birth: String,
    address: Option<String>,
    point: i32,
    chance: i32,
}

impl TryFrom<MemberRow> for Member {
    type Error = member::Error;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let role = row
            .member_role
            .parse::<MemberRole>()
            .map_err(|err| member::Error::Adapter(Box::new(err)))?;
        Ok(Member {
            id: row.member_id,
            role,
            email: row.email,
            password: row.password,
            name: row.name,
            phone: row.phone,
            birth: row.birth,
            address: row.address,
            point: row.point,
            chance: row.chance,
        })
    }
}

fn into_member(row: Option<MemberRow>) -> Result<Option<Member>, member::Error> {
    row.map(Member::try_from).transpose()
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    item_id: i64,
    name: String,
    price: i32,
    sale: bool,
    thumbnail: String,
    preference_count: i32,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.item_id,
            name: row.name,
            price: row.price,
            sale: row.sale,
            thumbnail: row.thumbnail,
            preference_count: row.preference_count,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PreferenceRow {
    preference_item_id: i64,
    member_id: i64,
    item_id: i64,
}

impl From<PreferenceRow> for PreferenceItem {
    fn from(row: PreferenceRow) -> Self {
        PreferenceItem {
            id: row.preference_item_id,
            member_id: row.member_id,
            item_id: row.item_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    preference_item_id: i64,
    name: String,
    price: i32,
    sale: bool,
    thumbnail: String,
}

impl From<SummaryRow> for PreferenceSummary {
    fn from(row: SummaryRow) -> Self {
        PreferenceSummary {
            thumbnail: row.thumbnail,
            name: row.name,
            price: row.price,
            sale: row.sale,
            preference_id: row.preference_item_id,
        }
    }
}

/// Map unique violations on insert to the matching domain error
fn insert_error(err: sqlx::Error, new_member: &NewMember) -> member::Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if let Some(err) = duplicate_error(db_err.constraint(), new_member) {
                return err;
            }
        }
    }
    err.into()
}

fn duplicate_error(constraint: Option<&str>, new_member: &NewMember) -> Option<member::Error> {
    match constraint? {
        "member_email_key" => Some(member::Error::DuplicateEmail(new_member.email.clone())),
        "member_phone_key" => Some(member::Error::DuplicatePhone(new_member.phone.clone())),
        _ => None,
    }
}

#[async_trait::async_trait]
impl MemberPort for PostgresDatabase {
    async fn exists_by_id(&self, member_id: MemberId) -> Result<bool, member::Error> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM member WHERE member_id = $1)")
            .bind(member_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, member::Error> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM member WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn exists_by_phone(&self, phone: &str) -> Result<bool, member::Error> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM member WHERE phone = $1)")
            .bind(phone)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_by_id(&self, member_id: MemberId) -> Result<Option<Member>, member::Error> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT member_id, member_role, email, password, name, phone, birth, address,
                   point, chance
            FROM member
            WHERE member_id = $1
            "#,
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;
        into_member(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, member::Error> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT member_id, member_role, email, password, name, phone, birth, address,
                   point, chance
            FROM member
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        into_member(row)
    }

    async fn find_by_name_and_phone(
        &self,
        name: &str,
        phone: &str,
    ) -> Result<Option<Member>, member::Error> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT member_id, member_role, email, password, name, phone, birth, address,
                   point, chance
            FROM member
            WHERE name = $1 AND phone = $2
            "#,
        )
        .bind(name)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        into_member(row)
    }

    async fn find_by_email_and_name_and_phone(
        &self,
        email: &str,
        name: &str,
        phone: &str,
    ) -> Result<Option<Member>, member::Error> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT member_id, member_role, email, password, name, phone, birth, address,
                   point, chance
            FROM member
            WHERE email = $1 AND name = $2 AND phone = $3
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        into_member(row)
    }

    async fn find_admin_by_member_id(
        &self,
        member_id: MemberId,
    ) -> Result<Option<AdminMember>, member::Error> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            "SELECT admin_member_id, member_id FROM admin_member WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, member_id)| AdminMember { id, member_id }))
    }

    async fn insert(&self, new_member: NewMember) -> Result<Member, member::Error> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            INSERT INTO member (member_role, email, password, name, phone, birth)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING member_id, member_role, email, password, name, phone, birth, address,
                      point, chance
            "#,
        )
        .bind(new_member.role.as_str())
        .bind(&new_member.email)
        .bind(&new_member.password)
        .bind(&new_member.name)
        .bind(&new_member.phone)
        .bind(&new_member.birth)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| insert_error(err, &new_member))?;
        let member = Member::try_from(row)?;

        if member.role == MemberRole::Admin {
            sqlx::query("INSERT INTO admin_member (member_id) VALUES ($1)")
                .bind(member.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(member)
    }

    async fn update_password(
        &self,
        member_id: MemberId,
        password_hash: &str,
    ) -> Result<(), member::Error> {
        let result = sqlx::query("UPDATE member SET password = $2 WHERE member_id = $1")
            .bind(member_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(member::Error::MemberDoesNotExist(member_id));
        }
        Ok(())
    }

    async fn update_address(&self, member_id: MemberId, address: &str) -> Result<(), member::Error> {
        let result = sqlx::query("UPDATE member SET address = $2 WHERE member_id = $1")
            .bind(member_id)
            .bind(address)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(member::Error::MemberDoesNotExist(member_id));
        }
        Ok(())
    }

    async fn change_point(&self, member_id: MemberId, delta_points: i32) -> Result<i32, member::Error> {
        let updated: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE member SET point = point + $2
            WHERE member_id = $1 AND point::bigint + $2 BETWEEN 0 AND 2147483647
            RETURNING point
            "#,
        )
        .bind(member_id)
        .bind(delta_points)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(point) = updated {
            return Ok(point);
        }

        // Nothing updated: the member is missing or the balance would leave the int4 range
        let current: Option<i32> = sqlx::query_scalar("SELECT point FROM member WHERE member_id = $1")
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?;
        match current {
            Some(current_points)
                if i64::from(current_points) + i64::from(delta_points) > i64::from(i32::MAX) =>
            {
                Err(member::Error::PointsOverflow {
                    current_points,
                    delta_points,
                })
            }
            Some(current_points) => Err(member::Error::NegativePointsTotal {
                current_points,
                delta_points,
            }),
            None => Err(member::Error::MemberDoesNotExist(member_id)),
        }
    }
}

#[async_trait::async_trait]
impl PreferencePort for PostgresDatabase {
    async fn find_item(&self, item_id: ItemId) -> Result<Option<Item>, preference::Error> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT item_id, name, price, sale, thumbnail, preference_count
            FROM item
            WHERE item_id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Item::from))
    }

    async fn find_preference(
        &self,
        preference_id: PreferenceId,
    ) -> Result<Option<PreferenceItem>, preference::Error> {
        let row = sqlx::query_as::<_, PreferenceRow>(
            r#"
            SELECT preference_item_id, member_id, item_id
            FROM preference_item
            WHERE preference_item_id = $1
            "#,
        )
        .bind(preference_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(PreferenceItem::from))
    }

    async fn find_summaries_by_member_id(
        &self,
        member_id: MemberId,
    ) -> Result<Vec<PreferenceSummary>, preference::Error> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT p.preference_item_id, i.name, i.price, i.sale, i.thumbnail
            FROM preference_item p
            JOIN item i ON i.item_id = p.item_id
            WHERE p.member_id = $1
            ORDER BY p.preference_item_id
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PreferenceSummary::from).collect())
    }

    async fn add(
        &self,
        member_id: MemberId,
        item_id: ItemId,
    ) -> Result<PreferenceItem, preference::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE item SET preference_count = preference_count + 1 WHERE item_id = $1",
        )
        .bind(item_id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Err(preference::Error::ItemDoesNotExist(item_id));
        }

        let row = sqlx::query_as::<_, PreferenceRow>(
            r#"
            INSERT INTO preference_item (member_id, item_id)
            VALUES ($1, $2)
            RETURNING preference_item_id, member_id, item_id
            "#,
        )
        .bind(member_id)
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn remove(&self, preference_id: PreferenceId) -> Result<(), preference::Error> {
        let mut tx = self.pool.begin().await?;

        let item_id: Option<i64> = sqlx::query_scalar(
            "DELETE FROM preference_item WHERE preference_item_id = $1 RETURNING item_id",
        )
        .bind(preference_id)
        .fetch_optional(&mut *tx)
        .await?;
        let item_id = item_id.ok_or(preference::Error::PreferenceDoesNotExist(preference_id))?;

        sqlx::query("UPDATE item SET preference_count = preference_count - 1 WHERE item_id = $1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

impl From<sqlx::Error> for member::Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Adapter(Box::new(err))
    }
}

impl From<sqlx::Error> for preference::Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Adapter(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::memory::tests::new_member;
    use rstest::*;
    use speculoos::prelude::*;

    #[rstest]
    #[case(Some("member_email_key"), Some("DuplicateEmail(\"a@b.com\")"))]
    #[case(Some("member_phone_key"), Some("DuplicatePhone(\"01011112222\")"))]
    #[case(Some("admin_member_member_id_key"), None)]
    #[case(None, None)]
    fn test_duplicate_error(#[case] constraint: Option<&str>, #[case] expected: Option<&str>) {
        let new_member = new_member("a@b.com", "01011112222");

        let res = duplicate_error(constraint, &new_member).map(|err| format!("{err:?}"));

        assert_that!(res.as_deref()).is_equal_to(expected);
    }

    async fn seed_item(pool: &PgPool) -> sqlx::Result<ItemId> {
        sqlx::query_scalar(
            r#"
            INSERT INTO item (name, price, thumbnail)
            VALUES ('item', 12000, 'thumb.png')
            RETURNING item_id
            "#,
        )
        .fetch_one(pool)
        .await
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_insert_duplicates(pool: PgPool) {
        // GIVEN a stored member
        let database = PostgresDatabase::new(pool);
        database
            .insert(new_member("a@b.com", "01011112222"))
            .await
            .unwrap();

        // WHEN inserting members that reuse the email, then the phone
        let same_email = database.insert(new_member("a@b.com", "01033334444")).await;
        let same_phone = database.insert(new_member("c@d.com", "01011112222")).await;

        // THEN each is reported against the right field
        assert_that!(same_email)
            .is_err()
            .matches(|err| matches!(err, member::Error::DuplicateEmail(email) if email == "a@b.com"));
        assert_that!(same_phone).is_err().matches(
            |err| matches!(err, member::Error::DuplicatePhone(phone) if phone == "01011112222"),
        );
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_change_point_bounds(pool: PgPool) {
        let database = PostgresDatabase::new(pool);
        let member = database
            .insert(new_member("a@b.com", "01011112222"))
            .await
            .unwrap();

        assert_that!(database.change_point(member.id, 5).await)
            .is_ok()
            .is_equal_to(5);
        assert_that!(database.change_point(member.id, -6).await)
            .is_err()
            .matches(|err| matches!(err, member::Error::NegativePointsTotal { .. }));
        assert_that!(database.change_point(member.id, i32::MAX).await)
            .is_err()
            .matches(|err| matches!(err, member::Error::PointsOverflow { .. }));
        assert_that!(database.change_point(member.id + 1, 1).await)
            .is_err()
            .matches(|err| matches!(err, member::Error::MemberDoesNotExist(_)));
        assert_that!(database.find_by_id(member.id).await.unwrap())
            .is_some()
            .matches(|m| m.point == 5);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_add_remove_counters(pool: PgPool) {
        // GIVEN a member and an item
        let item_id = seed_item(&pool).await.unwrap();
        let database = PostgresDatabase::new(pool);
        let member = database
            .insert(new_member("a@b.com", "01011112222"))
            .await
            .unwrap();

        // WHEN adding the item twice then removing one preference
        let first = database.add(member.id, item_id).await.unwrap();
        database.add(member.id, item_id).await.unwrap();
        database.remove(first.id).await.unwrap();

        // THEN
        // * the counter follows the stored rows
        // * a second remove and an unknown item are reported
        assert_that!(database.find_item(item_id).await.unwrap())
            .is_some()
            .matches(|item| item.preference_count == 1);
        assert_that!(database.find_summaries_by_member_id(member.id).await.unwrap())
            .has_length(1);
        assert_that!(database.remove(first.id).await)
            .is_err()
            .matches(|err| matches!(err, preference::Error::PreferenceDoesNotExist(_)));
        assert_that!(database.add(member.id, item_id + 1).await)
            .is_err()
            .matches(|err| matches!(err, preference::Error::ItemDoesNotExist(_)));
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_admin_signup(pool: PgPool) {
        let database = PostgresDatabase::new(pool);
        let mut admin = new_member("a@b.com", "01011112222");
        admin.role = MemberRole::Admin;

        let admin = database.insert(admin).await.unwrap();
        let bronze = database
            .insert(new_member("c@d.com", "01033334444"))
            .await
            .unwrap();

        assert_that!(database.find_admin_by_member_id(admin.id).await.unwrap()).is_some();
        assert_that!(database.find_admin_by_member_id(bronze.id).await.unwrap()).is_none();
    }
}
