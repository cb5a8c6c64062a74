//! [`User`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Select, Update},
    query::{self, Predicate, Projection},
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{
            self,
            postgres::{Connection as _, Statement},
            Postgres,
        },
        Database,
    },
    read::user::{list, ById, Column, View},
};

/// Columns of a whole [`User`] row.
const USER_COLUMNS: &str = "id, name, email, phone, address, \
                            created_at, updated_at, deleted_at";

impl Database<Select<By<Option<View>, ById>>> for Postgres {
    type Ok = Option<View>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<View>, ById>>,
    ) -> Result<Self::Ok, Self::Err> {
        let by_id = by.into_inner();
        let (predicate, params) = by_id.filter().into_parts();

        let mut stmt = Statement::new(&params);
        let sql = by_id_sql(&by_id.projection, &predicate, &mut stmt)?;

        Ok(self
            .replica()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(&sql, stmt.values())
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| view(&row, by_id.projection.fields())))
    }
}

impl<'i> Database<Select<By<Vec<View>, &'i list::Intent>>> for Postgres {
    type Ok = Vec<View>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<View>, &'i list::Intent>>,
    ) -> Result<Self::Ok, Self::Err> {
        let intent = by.into_inner();

        let mut stmt = Statement::new(intent.params());
        let sql = list_sql(intent, &mut stmt)?;

        Ok(self
            .replica()
            .await
            .map_err(tracerr::wrap!())?
            .query(&sql, stmt.values())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| view(row, intent.projection().fields()))
            .collect())
    }
}

impl<'i> Database<Select<By<list::TotalCount, &'i list::Intent>>>
    for Postgres
{
    type Ok = list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, &'i list::Intent>>,
    ) -> Result<Self::Ok, Self::Err> {
        let intent = by.into_inner();

        let mut stmt = Statement::new(intent.count_params());
        let sql = count_sql(intent, &mut stmt)?;

        Ok(self
            .replica()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(&sql, stmt.values())
            .await
            .map_err(tracerr::wrap!())?
            .map_or(0, |row| row.get::<_, i64>(0))
            .into())
    }
}

impl Database<Insert<User>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            name,
            email,
            phone,
            address,
            created_at,
            updated_at,
            lifecycle,
        } = user;
        let deleted_at = lifecycle.deleted_at();

        const SQL: &str = "\
            INSERT INTO users (\
                id, name, email, phone, address, \
                created_at, updated_at, deleted_at\
            ) \
            VALUES (\
                $1::VARCHAR, $2::VARCHAR, $3::VARCHAR, \
                $4::VARCHAR, $5::VARCHAR, \
                $6::TIMESTAMPTZ, $7::TIMESTAMPTZ, $8::TIMESTAMPTZ\
            )";
        self.primary()
            .await
            .map_err(tracerr::wrap!())?
            .exec(
                SQL,
                &[
                    &id,
                    &name,
                    &email,
                    &phone,
                    &address,
                    &created_at,
                    &updated_at,
                    &deleted_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl Database<Update<By<Option<User>, user::Edit>>> for Postgres {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Option<User>, user::Edit>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::Edit {
            id,
            profile:
                user::Profile {
                    name,
                    email,
                    phone,
                    address,
                },
            at,
        } = by.into_inner();

        let sql = format!(
            "UPDATE users \
             SET name = $2::VARCHAR, \
                 email = $3::VARCHAR, \
                 phone = $4::VARCHAR, \
                 address = $5::VARCHAR, \
                 updated_at = $6::TIMESTAMPTZ \
             WHERE id = $1::VARCHAR \
               AND deleted_at IS NULL \
             RETURNING {USER_COLUMNS}",
        );
        Ok(self
            .primary()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(&sql, &[&id, &name, &email, &phone, &address, &at])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| user(&row)))
    }
}

impl Database<Delete<By<User, user::Tombstone>>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Tombstone>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::Tombstone { id, at } = by.into_inner();

        const SQL: &str = "\
            UPDATE users \
            SET deleted_at = $2::TIMESTAMPTZ \
            WHERE id = $1::VARCHAR \
              AND deleted_at IS NULL";
        self.primary()
            .await
            .map_err(tracerr::wrap!())?
            .exec(SQL, &[&id, &at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// Renders the SQL selecting a single live [`User`], binding its parameters
/// to the provided [`Statement`].
fn by_id_sql(
    projection: &Projection<Column>,
    predicate: &Predicate,
    stmt: &mut Statement<'_>,
) -> Result<String, Traced<database::Error>> {
    Ok(format!(
        "SELECT {projection} \
         FROM users \
         WHERE {predicate} \
         LIMIT 1",
        predicate = stmt.predicate(predicate).map_err(tracerr::wrap!())?,
    ))
}

/// Renders the SQL fetching a page of the [`list::Intent`], binding its
/// parameters to the provided [`Statement`].
///
/// Filter parameters are bound before [`query::LIMIT`] and
/// [`query::OFFSET`].
fn list_sql(
    intent: &list::Intent,
    stmt: &mut Statement<'_>,
) -> Result<String, Traced<database::Error>> {
    Ok(format!(
        "SELECT {projection} \
         FROM users \
         WHERE {predicate} \
         ORDER BY {order} \
         LIMIT {limit} \
         OFFSET {offset}",
        projection = intent.projection(),
        predicate =
            stmt.predicate(intent.predicate()).map_err(tracerr::wrap!())?,
        order = intent.order_by(),
        limit = stmt.bind(query::LIMIT).map_err(tracerr::wrap!())?,
        offset = stmt.bind(query::OFFSET).map_err(tracerr::wrap!())?,
    ))
}

/// Renders the SQL counting all the rows of the [`list::Intent`], binding its
/// parameters to the provided [`Statement`].
fn count_sql(
    intent: &list::Intent,
    stmt: &mut Statement<'_>,
) -> Result<String, Traced<database::Error>> {
    Ok(format!(
        "SELECT COUNT(*)::INT8 \
         FROM users \
         WHERE {predicate}",
        predicate =
            stmt.predicate(intent.predicate()).map_err(tracerr::wrap!())?,
    ))
}

/// Reads a whole [`User`] out of the provided [`Row`].
fn user(row: &Row) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        lifecycle: row
            .get::<_, Option<user::DeletionDateTime>>("deleted_at")
            .into(),
    }
}

/// Reads the projected [`Column`]s of a [`User`] out of the provided [`Row`].
fn view(row: &Row, columns: &[Column]) -> View {
    let mut view = View::default();
    for column in columns {
        let name = column.as_ref();
        match column {
            Column::Id => view.id = row.get(name),
            Column::Name => view.name = row.get(name),
            Column::Email => view.email = row.get(name),
            Column::Phone => view.phone = row.get(name),
            Column::Address => view.address = row.get(name),
            Column::CreatedAt => view.created_at = row.get(name),
            Column::UpdatedAt => view.updated_at = row.get(name),
        }
    }
    view
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::user,
        infra::database::postgres::Statement,
        read::user::{list, ById},
    };

    use super::{by_id_sql, count_sql, list_sql};

    fn intent(filter: list::Filter, order_by: Option<&str>) -> list::Intent {
        list::Selector {
            filter,
            order_by: order_by.map(ToOwned::to_owned),
            ..list::Selector::default()
        }
        .intent()
        .unwrap()
    }

    fn named(name: &str, email: &str) -> list::Filter {
        list::Filter {
            name: Some(name.into()),
            email: Some(email.into()),
            ..list::Filter::default()
        }
    }

    #[test]
    fn renders_live_user_by_id() {
        let by_id = ById::new(user::Id::from("u1"), Some("name,email"));
        let (predicate, params) = by_id.filter().into_parts();
        let mut stmt = Statement::new(&params);

        assert_eq!(
            by_id_sql(&by_id.projection, &predicate, &mut stmt).unwrap(),
            "SELECT name,email \
             FROM users \
             WHERE deleted_at IS NULL AND id = $1::VARCHAR \
             LIMIT 1",
        );
        assert_eq!(stmt.values().len(), 1);
    }

    #[test]
    fn renders_page_with_pagination_after_filters() {
        let intent = intent(named("a", "b"), None);
        let mut stmt = Statement::new(intent.params());

        assert_eq!(
            list_sql(&intent, &mut stmt).unwrap(),
            "SELECT id,name,email,phone,address,created_at,updated_at \
             FROM users \
             WHERE deleted_at IS NULL \
               AND name LIKE $1::VARCHAR \
               AND email LIKE $2::VARCHAR \
             ORDER BY created_at DESC \
             LIMIT $3::INT8 \
             OFFSET $4::INT8",
        );
        assert_eq!(stmt.values().len(), 4);
    }

    #[test]
    fn renders_sanitized_order_and_projection() {
        let shaped = list::Selector {
            order_by: Some("name asc".into()),
            select_field: Some("email, unknown ,id".into()),
            ..list::Selector::default()
        }
        .intent()
        .unwrap();
        let mut stmt = Statement::new(shaped.params());

        let sql = list_sql(&shaped, &mut stmt).unwrap();
        assert!(sql.starts_with("SELECT email,id FROM users"), "{sql}");
        assert!(sql.contains(" ORDER BY name asc "), "{sql}");

        let defaulted =
            intent(list::Filter::default(), Some("name; DROP TABLE"));
        let mut stmt = Statement::new(defaulted.params());

        let sql = list_sql(&defaulted, &mut stmt).unwrap();
        assert!(sql.contains(" ORDER BY created_at DESC "), "{sql}");
    }

    #[test]
    fn counts_by_predicate_only() {
        let intent = intent(named("a", "b"), Some("name ASC"));
        let mut stmt = Statement::new(intent.count_params());

        let sql = count_sql(&intent, &mut stmt).unwrap();
        assert_eq!(
            sql,
            "SELECT COUNT(*)::INT8 \
             FROM users \
             WHERE deleted_at IS NULL \
               AND name LIKE $1::VARCHAR \
               AND email LIKE $2::VARCHAR",
        );
        assert_eq!(stmt.values().len(), 2);
        for clause in ["ORDER BY", "LIMIT", "OFFSET"] {
            assert!(!sql.contains(clause), "{sql}");
        }
    }
}
