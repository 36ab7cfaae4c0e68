//! Creator dashboard settings.
//!
//! Each panel gets an explicit struct with named fields instead of a
//! string-keyed toggle map, so an unknown setting name is a compile error
//! rather than a silently added key.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatorSettings {
    pub notifications: NotificationSettings,
    pub privacy: PrivacySettings,
    pub wallet: WalletSettings,
    pub api: ApiSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub new_subscriber: bool,
    pub new_comment: bool,
    pub new_donation: bool,
    pub content_milestone: bool,
    pub blockchain_events: bool,
    pub smart_contract_updates: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: false,
            new_subscriber: true,
            new_comment: true,
            new_donation: true,
            content_milestone: true,
            blockchain_events: true,
            smart_contract_updates: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationToggle {
    EmailNotifications,
    PushNotifications,
    NewSubscriber,
    NewComment,
    NewDonation,
    ContentMilestone,
    BlockchainEvents,
    SmartContractUpdates,
}

impl NotificationSettings {
    /// Flip one toggle and return its new value.
    pub fn toggle(&mut self, which: NotificationToggle) -> bool {
        let slot = match which {
            NotificationToggle::EmailNotifications => &mut self.email_notifications,
            NotificationToggle::PushNotifications => &mut self.push_notifications,
            NotificationToggle::NewSubscriber => &mut self.new_subscriber,
            NotificationToggle::NewComment => &mut self.new_comment,
            NotificationToggle::NewDonation => &mut self.new_donation,
            NotificationToggle::ContentMilestone => &mut self.content_milestone,
            NotificationToggle::BlockchainEvents => &mut self.blockchain_events,
            NotificationToggle::SmartContractUpdates => &mut self.smart_contract_updates,
        };
        *slot = !*slot;
        *slot
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileVisibility {
    #[default]
    Public,
    Private,
    SupportersOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacySettings {
    pub profile_visibility: ProfileVisibility,
    pub activity_feed: bool,
    pub show_earnings: bool,
    pub allow_data_collection: bool,
    pub encrypt_data: bool,
    #[serde(rename = "useZKProofs")]
    pub use_zk_proofs: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            profile_visibility: ProfileVisibility::Public,
            activity_feed: true,
            show_earnings: false,
            allow_data_collection: true,
            encrypt_data: true,
            use_zk_proofs: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyToggle {
    ActivityFeed,
    ShowEarnings,
    AllowDataCollection,
    EncryptData,
    UseZkProofs,
}

impl PrivacySettings {
    pub fn toggle(&mut self, which: PrivacyToggle) -> bool {
        let slot = match which {
            PrivacyToggle::ActivityFeed => &mut self.activity_feed,
            PrivacyToggle::ShowEarnings => &mut self.show_earnings,
            PrivacyToggle::AllowDataCollection => &mut self.allow_data_collection,
            PrivacyToggle::EncryptData => &mut self.encrypt_data,
            PrivacyToggle::UseZkProofs => &mut self.use_zk_proofs,
        };
        *slot = !*slot;
        *slot
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletSettings {
    pub auto_connect: bool,
    pub show_balance: bool,
    pub use_hardware_wallet: bool,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            auto_connect: true,
            show_balance: true,
            use_hardware_wallet: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletToggle {
    AutoConnect,
    ShowBalance,
    UseHardwareWallet,
}

impl WalletSettings {
    pub fn toggle(&mut self, which: WalletToggle) -> bool {
        let slot = match which {
            WalletToggle::AutoConnect => &mut self.auto_connect,
            WalletToggle::ShowBalance => &mut self.show_balance,
            WalletToggle::UseHardwareWallet => &mut self.use_hardware_wallet,
        };
        *slot = !*slot;
        *slot
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSettings {
    pub enable_api: bool,
    pub allow_third_party_access: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            enable_api: true,
            allow_third_party_access: false,
        }
    }
}
