use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use groupframe_db::models::User;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        email: String,
        username: String,
        display_name: String,
        password_hash: String,
    ) -> DaoResult<User> {
        let now = DateTime::now();
        let user = User {
            id: None,
            email: email.to_lowercase(),
            username,
            display_name,
            password_hash: Some(password_hash),
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "email": email.to_lowercase(), "is_active": true })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_by_username(&self, username: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "username": username, "is_active": true })
            .await?
            .ok_or(DaoError::NotFound)
    }

    /// Login accepts either identifier; anything with an `@` is an email.
    pub async fn find_by_login(&self, login: &str) -> DaoResult<User> {
        if login.contains('@') {
            self.find_by_email(login).await
        } else {
            self.find_by_username(login).await
        }
    }

    pub async fn touch_login(&self, user_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "last_login_at": DateTime::now() } })
            .await
    }
}
