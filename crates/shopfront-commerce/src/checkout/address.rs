//! Addresses and the saved-address book.

use crate::error::CommerceError;
use crate::ids::AddressId;
use crate::persist::{Persisted, StateRepository};
use serde::{Deserialize, Serialize};

/// A postal address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    /// Address ID (None until saved to an address book).
    pub id: Option<AddressId>,
    /// Label such as "Home" or "Office".
    pub name: String,
    /// Recipient name.
    pub full_name: String,
    pub phone: String,
    /// Street address.
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    /// Default shipping address for the owner.
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Create an unsaved address.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            full_name: full_name.into(),
            phone: phone.into(),
            address: address.into(),
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
            country: country.into(),
            is_default: false,
        }
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} {}, {}",
            self.address, self.city, self.state, self.zip_code, self.country
        )
    }

    /// Check if address is complete.
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    /// Reject incomplete addresses with `Validation`.
    pub fn validate(&self) -> Result<(), CommerceError> {
        match self.missing_field() {
            Some(field) => Err(CommerceError::Validation(format!(
                "address is missing {field}"
            ))),
            None => Ok(()),
        }
    }

    fn missing_field(&self) -> Option<&'static str> {
        [
            ("full name", &self.full_name),
            ("phone", &self.phone),
            ("street address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip code", &self.zip_code),
            ("country", &self.country),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

/// Persisted address book snapshot, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AddressBookState {
    pub addresses: Vec<Address>,
}

/// Saved addresses with at most one default.
pub struct AddressBook {
    state: Persisted<AddressBookState>,
}

impl AddressBook {
    /// Rehydrate the address book from `repo`.
    pub fn load(repo: Box<dyn StateRepository<AddressBookState>>) -> Result<Self, CommerceError> {
        Ok(Self {
            state: Persisted::load("addresses", repo)?,
        })
    }

    /// Save a new address and return its id.
    ///
    /// The first address saved becomes the default.
    pub fn add(&mut self, mut address: Address) -> Result<AddressId, CommerceError> {
        address.validate()?;
        let id = AddressId::generate();
        address.id = Some(id.clone());
        self.state.update(|book| {
            address.is_default |= book.addresses.is_empty();
            if address.is_default {
                clear_default(book);
            }
            book.addresses.push(address);
            Ok(())
        })?;
        tracing::debug!(address_id = %id, "added address");
        Ok(id)
    }

    /// Replace a saved address's fields, keeping its id.
    ///
    /// Unsetting the default flag on the current default is ignored so the
    /// book never loses its default.
    pub fn update(&mut self, id: &AddressId, mut address: Address) -> Result<(), CommerceError> {
        address.validate()?;
        self.state.update(|book| {
            let index = position(book, id)?;
            address.id = Some(id.clone());
            if address.is_default {
                clear_default(book);
            } else {
                address.is_default = book.addresses[index].is_default;
            }
            book.addresses[index] = address;
            Ok(())
        })?;
        tracing::debug!(address_id = %id, "updated address");
        Ok(())
    }

    /// Delete a saved address, promoting the earliest remaining address
    /// when the default is removed.
    pub fn remove(&mut self, id: &AddressId) -> Result<Address, CommerceError> {
        let removed = self.state.update(|book| {
            let index = position(book, id)?;
            let removed = book.addresses.remove(index);
            if removed.is_default {
                if let Some(first) = book.addresses.first_mut() {
                    first.is_default = true;
                }
            }
            Ok(removed)
        })?;
        tracing::debug!(address_id = %id, "removed address");
        Ok(removed)
    }

    /// Make `id` the only default address.
    pub fn set_default(&mut self, id: &AddressId) -> Result<(), CommerceError> {
        self.state.update(|book| {
            let index = position(book, id)?;
            clear_default(book);
            book.addresses[index].is_default = true;
            Ok(())
        })
    }

    /// The default address, `None` only when the book is empty.
    pub fn default_address(&self) -> Option<&Address> {
        self.state.get().addresses.iter().find(|a| a.is_default)
    }

    /// Look up a saved address.
    pub fn get(&self, id: &AddressId) -> Option<&Address> {
        self.state
            .get()
            .addresses
            .iter()
            .find(|a| a.id.as_ref() == Some(id))
    }

    /// Saved addresses in the order they were added.
    pub fn addresses(&self) -> &[Address] {
        &self.state.get().addresses
    }

    pub(crate) fn flush(&self) -> Result<(), CommerceError> {
        self.state.flush()
    }
}

impl std::fmt::Debug for AddressBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressBook")
            .field("state", &self.state)
            .finish()
    }
}

fn position(book: &AddressBookState, id: &AddressId) -> Result<usize, CommerceError> {
    book.addresses
        .iter()
        .position(|a| a.id.as_ref() == Some(id))
        .ok_or_else(|| CommerceError::not_found("address", id))
}

fn clear_default(book: &mut AddressBookState) {
    for a in &mut book.addresses {
        a.is_default = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn book() -> AddressBook {
        let cache = testing::memory_cache();
        AddressBook::load(testing::repo(&cache, "address-storage")).unwrap()
    }

    fn defaults(book: &AddressBook) -> usize {
        book.addresses().iter().filter(|a| a.is_default).count()
    }

    #[test]
    fn test_first_address_becomes_default() {
        let mut book = book();
        let home = book.add(testing::address("Home")).unwrap();
        let office = book.add(testing::address("Office")).unwrap();

        assert_eq!(book.default_address().unwrap().id.as_ref(), Some(&home));
        assert!(!book.get(&office).unwrap().is_default);
    }

    #[test]
    fn test_single_default_invariant() {
        let mut book = book();
        book.add(testing::address("Home")).unwrap();
        let mut office = testing::address("Office");
        office.is_default = true;
        let office = book.add(office).unwrap();
        assert_eq!(defaults(&book), 1);
        assert_eq!(book.default_address().unwrap().id.as_ref(), Some(&office));

        let third = book.add(testing::address("Parents")).unwrap();
        book.set_default(&third).unwrap();
        assert_eq!(defaults(&book), 1);
        assert_eq!(book.default_address().unwrap().name, "Parents");
    }

    #[test]
    fn test_remove_default_promotes_earliest() {
        let mut book = book();
        let home = book.add(testing::address("Home")).unwrap();
        book.add(testing::address("Office")).unwrap();
        book.add(testing::address("Parents")).unwrap();

        book.remove(&home).unwrap();
        assert_eq!(book.default_address().unwrap().name, "Office");
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_update_keeps_id_and_default() {
        let mut book = book();
        let home = book.add(testing::address("Home")).unwrap();
        let mut changed = testing::address("Home");
        changed.city = "Pune".to_string();
        book.update(&home, changed).unwrap();

        let saved = book.get(&home).unwrap();
        assert_eq!(saved.city, "Pune");
        assert!(saved.is_default);
    }

    #[test]
    fn test_missing_ids_and_invalid_input() {
        let mut book = book();
        let missing = AddressId::new("ADDR-NOPE");
        assert!(book.remove(&missing).unwrap_err().is_not_found());
        assert!(book.set_default(&missing).unwrap_err().is_not_found());

        let mut incomplete = testing::address("Home");
        incomplete.zip_code = " ".to_string();
        assert!(matches!(
            book.add(incomplete),
            Err(CommerceError::Validation(_))
        ));
        assert!(book.addresses().is_empty());
    }
}
