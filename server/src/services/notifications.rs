//! User notification inbox.

use std::sync::Arc;

use crate::store::{RowStore, StoreError};
use crate::types::{NewNotification, Notification, NotificationId};

/// Thin service over the store's notification rows.
pub struct NotificationService<S> {
    store: Arc<S>,
}

impl<S> Clone for NotificationService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RowStore> NotificationService<S> {
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn notify(&self, notification: NewNotification) -> Result<NotificationId, StoreError> {
        let kind = notification.kind;
        let id = self.store.insert_notification(notification)?;
        tracing::debug!("stored {kind} notification {id}");
        Ok(id)
    }

    /// Like [`Self::notify`], but a failure is logged and dropped.
    ///
    /// Used for notifications that follow an edge mutation: the mutation has
    /// already been committed and must not be reported as failed.
    pub fn notify_best_effort(&self, notification: NewNotification) -> Option<NotificationId> {
        let kind = notification.kind;
        let recipient = notification.recipient.clone();
        match self.notify(notification) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("dropped {kind} notification for {recipient}: {e}");
                None
            }
        }
    }

    /// Up to `limit` notifications for `recipient`, newest first.
    pub fn list(
        &self,
        recipient: &str,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<Notification>, StoreError> {
        self.store.fetch_notifications(recipient, unread_only, limit)
    }

    /// Returns `false` if the notification does not exist.
    pub fn mark_read(&self, id: NotificationId) -> Result<bool, StoreError> {
        self.store.mark_notification_read(id)
    }

    pub fn mark_all_read(&self, recipient: &str) -> Result<usize, StoreError> {
        let changed = self.store.mark_all_notifications_read(recipient)?;
        tracing::debug!("marked {changed} notifications read for {recipient}");
        Ok(changed)
    }

    pub fn unread_count(&self, recipient: &str) -> Result<usize, StoreError> {
        self.store.unread_notification_count(recipient)
    }

    /// Returns `false` if the notification does not exist.
    pub fn delete(&self, id: NotificationId) -> Result<bool, StoreError> {
        let deleted = self.store.delete_notification(id)?;
        if deleted {
            tracing::debug!("deleted notification {id}");
        }
        Ok(deleted)
    }
}
