use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use sysinfo::Users;

/// Resolves a numeric uid to an account name.
pub trait OwnerDirectory {
    fn username(&self, uid: u32) -> Option<String>;
}

impl OwnerDirectory for HashMap<u32, String> {
    fn username(&self, uid: u32) -> Option<String> {
        self.get(&uid).cloned()
    }
}

type AccountLookup = Box<dyn Fn(u32) -> Option<String>>;

/// The system account database.
///
/// Seeded from the account list at startup. A uid missing from the seed is
/// looked up again every time it is asked for, so accounts created later or
/// served only through NSS resolve as soon as the system knows them. Names
/// found that way are remembered; misses are not.
pub struct SystemUsers {
    known: RefCell<HashMap<u32, String>>,
    lookup: AccountLookup,
}

impl SystemUsers {
    pub fn load() -> Self {
        let users = Users::new_with_refreshed_list();
        let seed: HashMap<u32, String> = users
            .list()
            .iter()
            .map(|user| (**user.id(), user.name().to_string()))
            .collect();
        tracing::debug!(count = seed.len(), "loaded user accounts");
        Self::with_lookup(seed, account_name)
    }

    pub(crate) fn with_lookup(
        seed: HashMap<u32, String>,
        lookup: impl Fn(u32) -> Option<String> + 'static,
    ) -> Self {
        Self {
            known: RefCell::new(seed),
            lookup: Box::new(lookup),
        }
    }

    pub fn len(&self) -> usize {
        self.known.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.borrow().is_empty()
    }
}

impl fmt::Debug for SystemUsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemUsers")
            .field("known", &self.len())
            .finish_non_exhaustive()
    }
}

impl OwnerDirectory for SystemUsers {
    fn username(&self, uid: u32) -> Option<String> {
        if let Some(name) = self.known.borrow().get(&uid) {
            return Some(name.clone());
        }
        let name = (self.lookup)(uid)?;
        tracing::debug!(uid, name = %name, "resolved account outside startup list");
        self.known.borrow_mut().insert(uid, name.clone());
        Some(name)
    }
}

#[cfg(unix)]
fn account_name(uid: u32) -> Option<String> {
    use nix::unistd::{Uid, User};

    match User::from_uid(Uid::from_raw(uid)) {
        Ok(user) => user.map(|u| u.name),
        Err(err) => {
            tracing::debug!(uid, error = %err, "account lookup failed");
            None
        }
    }
}

#[cfg(not(unix))]
fn account_name(_uid: u32) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn map_lookup() {
        let dir: HashMap<u32, String> = [(0, "root".to_string())].into();
        assert_eq!(dir.username(0).as_deref(), Some("root"));
        assert_eq!(dir.username(4242), None);
    }

    #[test]
    fn system_users_resolve_root() {
        let users = SystemUsers::load();
        if let Some(name) = users.username(0) {
            assert_eq!(name, "root");
        }
    }

    #[test]
    fn seeded_names_skip_the_lookup() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let users = SystemUsers::with_lookup([(0, "root".to_string())].into(), move |_| {
            counter.set(counter.get() + 1);
            None
        });
        assert_eq!(users.username(0).as_deref(), Some("root"));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn misses_are_asked_again() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let users = SystemUsers::with_lookup(HashMap::new(), move |_| {
            counter.set(counter.get() + 1);
            None
        });
        assert_eq!(users.username(2000), None);
        assert_eq!(users.username(2000), None);
        assert_eq!(calls.get(), 2);
        assert!(users.is_empty());
    }

    #[test]
    fn late_account_is_resolved_and_remembered() {
        let accounts: Rc<RefCell<HashMap<u32, String>>> = Rc::default();
        let backing = Rc::clone(&accounts);
        let users = SystemUsers::with_lookup(HashMap::new(), move |uid| {
            backing.borrow().get(&uid).cloned()
        });

        assert_eq!(users.username(2000), None);
        accounts.borrow_mut().insert(2000, "deploy".into());
        assert_eq!(users.username(2000).as_deref(), Some("deploy"));

        accounts.borrow_mut().clear();
        assert_eq!(users.username(2000).as_deref(), Some("deploy"));
        assert_eq!(users.len(), 1);
    }
}
