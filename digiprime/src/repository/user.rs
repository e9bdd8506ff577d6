use std::collections::{BTreeMap, HashSet};
use std::fmt::Debug;

use async_trait::async_trait;

use model::domain::offer::User;

#[async_trait]
pub trait UserRepository: Debug + Sync + Send {
    async fn get(&self, username: &str) -> Option<User>;

    /// The subset of `usernames` that belong to a registered user.
    async fn find_usernames(&self, usernames: &[String]) -> HashSet<String>;

    /// Every registered username, sorted.
    async fn usernames(&self) -> Vec<String>;
}

#[derive(Debug)]
pub struct UserRepositoryHashMapImpl {
    users: BTreeMap<String, User>,
}

impl UserRepositoryHashMapImpl {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.username.clone(), user))
                .collect(),
        }
    }
}

#[async_trait]
impl UserRepository for UserRepositoryHashMapImpl {
    async fn get(&self, username: &str) -> Option<User> {
        self.users.get(username).cloned()
    }

    async fn find_usernames(&self, usernames: &[String]) -> HashSet<String> {
        trace!("find users {:?}", usernames);
        usernames
            .iter()
            .filter(|username| self.users.contains_key(username.as_str()))
            .cloned()
            .collect()
    }

    async fn usernames(&self) -> Vec<String> {
        self.users.keys().cloned().collect()
    }
}
