//! SQLite-backed [`GraphStore`].
//!
//! The store borrows an open connection instead of owning one, so it can
//! run over a `rusqlite::Transaction` (which derefs to `Connection`). That
//! is how a whole role binding gets resolved and applied atomically.

use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

use crate::error::{KingraphError, Result};
use crate::model::{FamilyId, Gender, NewPerson, Person, PersonId, PersonUpdate};
use crate::roles::RoleId;
use crate::store::GraphStore;

const PERSON_COLUMNS: &str = "id, family_id, name, gender, father_id, mother_id, spouse_id, \
     is_registered, standard_role, relationship, birth_date";

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteStore { conn }
    }
}

fn row_to_person(row: &Row<'_>) -> rusqlite::Result<Person> {
    let gender: Option<String> = row.get(3)?;
    let standard_role: Option<String> = row.get(8)?;
    Ok(Person {
        id: PersonId(row.get(0)?),
        family_id: FamilyId(row.get(1)?),
        name: row.get(2)?,
        gender: Gender::from_db(gender.as_deref()),
        father_id: row.get::<_, Option<i64>>(4)?.map(PersonId),
        mother_id: row.get::<_, Option<i64>>(5)?.map(PersonId),
        spouse_id: row.get::<_, Option<i64>>(6)?.map(PersonId),
        registered: row.get(7)?,
        // Unrecognized role strings read back as None rather than failing.
        standard_role: standard_role.as_deref().and_then(RoleId::parse),
        relationship: row.get(9)?,
        birth_date: row.get(10)?,
    })
}

impl GraphStore for SqliteStore<'_> {
    fn get_person(&self, id: PersonId) -> Result<Person> {
        let sql = format!(
            "SELECT {} FROM family_members WHERE id = ?1",
            PERSON_COLUMNS
        );
        self.conn
            .query_row(&sql, params![id.0], row_to_person)
            .optional()?
            .ok_or(KingraphError::NotFound(id))
    }

    fn create_person(&mut self, fields: NewPerson) -> Result<Person> {
        self.conn.execute(
            "INSERT INTO family_members \
             (family_id, name, gender, father_id, mother_id, spouse_id, \
              is_registered, standard_role, relationship, birth_date) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                fields.family_id.0,
                fields.name,
                fields.gender.as_db(),
                fields.father_id.map(|p| p.0),
                fields.mother_id.map(|p| p.0),
                fields.spouse_id.map(|p| p.0),
                fields.registered,
                fields.standard_role.map(|r| r.as_str()),
                fields.relationship,
                fields.birth_date,
            ],
        )?;
        let id = PersonId(self.conn.last_insert_rowid());
        Ok(Person::from_new(id, fields))
    }

    fn update_person(&mut self, id: PersonId, update: &PersonUpdate) -> Result<()> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(name) = &update.name {
            sets.push("name = ?");
            values.push(Box::new(name.clone()));
        }
        if let Some(gender) = update.gender {
            sets.push("gender = ?");
            values.push(Box::new(gender.as_db()));
        }
        if let Some(father) = update.father_id {
            sets.push("father_id = ?");
            values.push(Box::new(father.0));
        }
        if let Some(mother) = update.mother_id {
            sets.push("mother_id = ?");
            values.push(Box::new(mother.0));
        }
        if let Some(spouse) = update.spouse_id {
            sets.push("spouse_id = ?");
            values.push(Box::new(spouse.0));
        }
        if let Some(registered) = update.registered {
            sets.push("is_registered = ?");
            values.push(Box::new(registered));
        }
        if let Some(role) = update.standard_role {
            sets.push("standard_role = ?");
            values.push(Box::new(role.as_str()));
        }
        if let Some(relationship) = &update.relationship {
            sets.push("relationship = ?");
            values.push(Box::new(relationship.clone()));
        }
        if let Some(birth_date) = update.birth_date {
            sets.push("birth_date = ?");
            values.push(Box::new(birth_date));
        }

        if sets.is_empty() {
            return Ok(());
        }

        values.push(Box::new(id.0));
        let sql = format!(
            "UPDATE family_members SET {} WHERE id = ?",
            sets.join(", ")
        );
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let rows_affected = self.conn.execute(&sql, &param_refs[..])?;

        if rows_affected == 0 {
            return Err(KingraphError::NotFound(id));
        }
        Ok(())
    }

    fn family_members(&self, family: FamilyId) -> Result<Vec<Person>> {
        let sql = format!(
            "SELECT {} FROM family_members WHERE family_id = ?1 ORDER BY id",
            PERSON_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let members = stmt
            .query_map(params![family.0], row_to_person)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use chrono::NaiveDate;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::init(&conn).unwrap();
        conn
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let conn = test_conn();
        let mut store = SqliteStore::new(&conn);

        let mut fields = NewPerson::new(FamilyId(1), "陈建国");
        fields.gender = Gender::Male;
        fields.registered = true;
        fields.standard_role = Some(RoleId::Father);
        fields.relationship = Some("一家之主".to_string());
        fields.birth_date = NaiveDate::from_ymd_opt(1965, 5, 12);

        let created = store.create_person(fields).unwrap();
        let fetched = store.get_person(created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.standard_role, Some(RoleId::Father));
        assert_eq!(fetched.birth_date, NaiveDate::from_ymd_opt(1965, 5, 12));
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let conn = test_conn();
        let store = SqliteStore::new(&conn);
        assert!(matches!(
            store.get_person(PersonId(99)),
            Err(KingraphError::NotFound(PersonId(99)))
        ));
    }

    #[test]
    fn test_ids_are_assigned_sequentially() {
        let conn = test_conn();
        let mut store = SqliteStore::new(&conn);
        let a = store.create_person(NewPerson::new(FamilyId(1), "甲")).unwrap();
        let b = store.create_person(NewPerson::new(FamilyId(1), "乙")).unwrap();
        assert!(b.id.0 > a.id.0);
    }

    #[test]
    fn test_update_partial_fields() {
        let conn = test_conn();
        let mut store = SqliteStore::new(&conn);
        let p = store.create_person(NewPerson::new(FamilyId(1), "某人")).unwrap();

        let mut update = PersonUpdate::default();
        update.gender = Some(Gender::Female);
        update.mother_id = Some(PersonId(5));
        store.update_person(p.id, &update).unwrap();

        let after = store.get_person(p.id).unwrap();
        assert_eq!(after.gender, Gender::Female);
        assert_eq!(after.mother_id, Some(PersonId(5)));
        assert_eq!(after.father_id, None);
        assert_eq!(after.name, "某人");
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let conn = test_conn();
        let mut store = SqliteStore::new(&conn);
        let mut update = PersonUpdate::default();
        update.registered = Some(true);
        assert!(matches!(
            store.update_person(PersonId(42), &update),
            Err(KingraphError::NotFound(_))
        ));
    }

    #[test]
    fn test_empty_update_is_noop() {
        let conn = test_conn();
        let mut store = SqliteStore::new(&conn);
        store
            .update_person(PersonId(42), &PersonUpdate::default())
            .unwrap();
    }

    #[test]
    fn test_family_members_filters_and_orders() {
        let conn = test_conn();
        let mut store = SqliteStore::new(&conn);
        store.create_person(NewPerson::new(FamilyId(1), "甲")).unwrap();
        store.create_person(NewPerson::new(FamilyId(2), "丙")).unwrap();
        store.create_person(NewPerson::new(FamilyId(1), "乙")).unwrap();

        let members = store.family_members(FamilyId(1)).unwrap();
        let names: Vec<&str> = members.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["甲", "乙"]);
    }

    #[test]
    fn test_rollback_discards_writes() {
        let mut conn = test_conn();
        let created_id = {
            let tx = conn.transaction().unwrap();
            let id = {
                let mut store = SqliteStore::new(&tx);
                store.create_person(NewPerson::new(FamilyId(1), "短命")).unwrap().id
            };
            // Dropped without commit: everything rolls back.
            drop(tx);
            id
        };

        let store = SqliteStore::new(&conn);
        assert!(matches!(
            store.get_person(created_id),
            Err(KingraphError::NotFound(_))
        ));
    }
}
