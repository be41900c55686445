//! Object manager proxy on the BlueZ service.

use std::collections::HashMap;
use zbus::proxy;
use zvariant::{OwnedObjectPath, OwnedValue};

/// Proxy for `org.freedesktop.DBus.ObjectManager` at the BlueZ root.
///
/// Used to enumerate the media players exposed by connected devices.
#[proxy(
    interface = "org.freedesktop.DBus.ObjectManager",
    default_service = "org.bluez",
    default_path = "/"
)]
pub(crate) trait BluezObjectManager {
    /// Returns `{ object_path: { interface_name: { property: value } } }`.
    fn get_managed_objects(
        &self,
    ) -> zbus::Result<HashMap<OwnedObjectPath, HashMap<String, HashMap<String, OwnedValue>>>>;
}
