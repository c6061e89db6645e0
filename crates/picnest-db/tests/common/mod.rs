#![allow(dead_code)]

use std::sync::{Arc, LazyLock};

use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{DateTime, TimeZone, Utc};

use picnest_db::password::hash_password_with;
use picnest_db::{Database, ManualClock, Schema};
use picnest_types::api::{NewPost, NewUser};
use picnest_types::{Post, User};

/// One low-cost hash shared by every test user.
pub static PASSWORD: LazyLock<String> = LazyLock::new(|| {
    let argon2 = Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(256, 1, 1, None).unwrap(),
    );
    hash_password_with(&argon2, "secret-password").unwrap()
});

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn setup() -> (Database, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let db = Database::open_in_memory(Arc::new(Schema::social()))
        .unwrap()
        .with_clock(clock.clone());
    (db, clock)
}

pub fn new_user(name: &str) -> NewUser {
    NewUser::new(name, format!("{}@example.com", name), PASSWORD.as_str())
}

pub fn user(db: &Database, name: &str) -> User {
    db.create(new_user(name)).unwrap()
}

pub fn post(db: &Database, author: &User, image: &str) -> Post {
    db.create(NewPost::new(author.id, image)).unwrap()
}
