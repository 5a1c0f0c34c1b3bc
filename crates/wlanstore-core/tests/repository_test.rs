// Integration tests for profile CRUD, permissions and masking.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::atomic::Ordering;

use pretty_assertions::assert_eq;

use common::{APP, DEVICE_OWNER, OTHER_APP, PROFILE_OWNER, SETTINGS, WIZARD, harness};
use wlanstore_core::model::{EapMethod, IpConfiguration, ProxySettings};
use wlanstore_core::{
    ChangeReason, CoreError, Credential, EnterpriseConfig, MacAddress, MacRandomizationSetting,
    NetworkId, NetworkStatus, ProfileDraft, Uid, UserId,
};

// ── Load gate ───────────────────────────────────────────────────────

#[test]
fn nothing_works_before_load() {
    let mut h = harness().unloaded().build();

    let err = h
        .repo
        .add_or_update_network(ProfileDraft::psk("home", "password1"), APP, None)
        .unwrap_err();
    assert!(matches!(err, CoreError::StoreNotLoaded));
    assert!(matches!(
        h.repo.save_to_store(false),
        Err(CoreError::StoreNotLoaded)
    ));
    assert!(h.repo.configured_networks(Uid::SYSTEM).is_empty());
    assert!(h.repo.configured_network_with_password(NetworkId::new(0)).is_none());

    h.repo.load_from_store().unwrap();
    assert!(h.repo.is_loaded());
    assert!(
        h.repo
            .add_or_update_network(ProfileDraft::psk("home", "password1"), APP, None)
            .is_ok()
    );
}

#[test]
fn failed_read_keeps_gate_closed() {
    let h = harness().unloaded().build();
    h.store.state.lock().unwrap().fail_reads = true;
    let mut repo = h.repo;

    assert!(matches!(
        repo.load_from_store(),
        Err(CoreError::Persistence { .. })
    ));
    assert!(!repo.is_loaded());
}

// ── Add / update ────────────────────────────────────────────────────

#[test]
fn add_assigns_identity_and_defaults() {
    let mut h = harness().build();
    let mut changes = h.repo.subscribe_changes();

    let result = h
        .repo
        .add_or_update_network(ProfileDraft::psk("home", "password1"), APP, Some("com.example"))
        .unwrap();
    assert_eq!(result.network_id, NetworkId::new(0));
    assert!(result.is_new);
    assert!(result.credential_changed);
    assert!(!result.ip_changed);
    assert!(!result.proxy_changed);

    let stored = h.repo.configured_network_with_password(result.network_id).unwrap();
    assert_eq!(stored.ssid, "\"home\"");
    assert_eq!(stored.config_key(), "\"home\"WPA_PSK");
    assert_eq!(stored.pre_shared_key, Some(Credential::new("\"password1\"")));
    assert_eq!(stored.status, NetworkStatus::Disabled);
    assert!(stored.selection.is_enabled());
    assert_eq!(stored.creator_uid, APP);
    assert_eq!(stored.creator_name.as_deref(), Some("com.example"));
    assert_eq!(stored.randomized_mac, MacAddress::new("02:11:22:33:44:01"));
    assert!(stored.creation_time.is_some());

    let change = changes.try_recv().unwrap();
    assert_eq!(change.reason, ChangeReason::Added);
    assert_eq!(change.profile.pre_shared_key, Some(Credential::mask()));
    assert!(change.profile.randomized_mac.is_placeholder());

    assert_eq!(h.listener.take(), vec!["added:0".to_owned()]);
    assert_eq!(h.store.user_ssids(UserId::SYSTEM), vec!["\"home\"".to_owned()]);
}

#[test]
fn update_by_config_key_reports_credential_changes() {
    let mut h = harness().build();
    let first = h
        .repo
        .add_or_update_network(ProfileDraft::psk("home", "password1"), APP, None)
        .unwrap();

    let same = h
        .repo
        .add_or_update_network(ProfileDraft::psk("home", "password1"), APP, None)
        .unwrap();
    assert_eq!(same.network_id, first.network_id);
    assert!(!same.is_new);
    assert!(!same.credential_changed);

    h.repo.update_network_after_connect(first.network_id).unwrap();
    let changed = h
        .repo
        .add_or_update_network(ProfileDraft::psk("home", "password2"), APP, None)
        .unwrap();
    assert!(changed.credential_changed);
    let stored = h.repo.configured_network_with_password(first.network_id).unwrap();
    assert!(!stored.selection.has_ever_connected);
    assert_eq!(h.repo.network_count(), 1);
}

#[test]
fn masked_credentials_never_overwrite_cleartext() {
    let mut h = harness().build();
    let id = h
        .repo
        .add_or_update_network(ProfileDraft::psk("home", "password1"), APP, None)
        .unwrap()
        .network_id;

    let draft = ProfileDraft {
        pre_shared_key: Some(Credential::mask()),
        hidden_ssid: Some(true),
        ..ProfileDraft::for_network(id)
    };
    let result = h.repo.add_or_update_network(draft, APP, None).unwrap();
    assert!(result.credential_changed);

    let stored = h.repo.configured_network_with_password(id).unwrap();
    assert_eq!(stored.pre_shared_key, Some(Credential::new("\"password1\"")));
    assert!(stored.hidden_ssid);
}

#[test]
fn wep_keys_merge_per_slot() {
    let mut h = harness().build();
    let id = h
        .repo
        .add_or_update_network(ProfileDraft::wep("old", "abcde"), APP, None)
        .unwrap()
        .network_id;

    let draft = ProfileDraft {
        wep_keys: Some([Some(Credential::mask()), Some(Credential::new("0123456789")), None, None]),
        ..ProfileDraft::for_network(id)
    };
    h.repo.add_or_update_network(draft, APP, None).unwrap();

    let stored = h.repo.configured_network_with_password(id).unwrap();
    assert_eq!(stored.wep_keys[0], Some(Credential::new("\"abcde\"")));
    assert_eq!(stored.wep_keys[1], Some(Credential::new("0123456789")));
    assert_eq!(stored.wep_keys[2], None);
    assert_eq!(stored.config_key(), "\"old\"WEP");
}

#[test]
fn rejected_drafts_leave_no_trace() {
    let mut h = harness().build();

    let err = h
        .repo
        .add_or_update_network(ProfileDraft::psk("home", "short"), APP, None)
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput { ref field, .. } if field == "pre_shared_key"));

    let err = h
        .repo
        .add_or_update_network(ProfileDraft::for_network(NetworkId::new(42)), APP, None)
        .unwrap_err();
    assert!(matches!(err, CoreError::NetworkNotFound { .. }));
    assert!(err.is_no_effect());

    let draft = ProfileDraft {
        ip_configuration: None,
        ..ProfileDraft::open("cafe")
    };
    assert!(matches!(
        h.repo.add_or_update_network(draft, APP, None),
        Err(CoreError::InvalidInput { .. })
    ));

    assert_eq!(h.repo.network_count(), 0);
    assert_eq!(h.store.writes(), 0);
}

#[test]
fn key_store_failure_aborts_the_update() {
    let mut h = harness().build();
    let enterprise = EnterpriseConfig {
        eap_method: EapMethod::Peap,
        identity: "alice".into(),
        password: Some(Credential::new("secret")),
        ..EnterpriseConfig::default()
    };
    let id = h
        .repo
        .add_or_update_network(ProfileDraft::eap("corp", enterprise.clone()), SETTINGS, None)
        .unwrap()
        .network_id;

    h.key_store_fail.store(true, Ordering::SeqCst);
    let mut changed = enterprise;
    changed.identity = "mallory".into();
    let err = h
        .repo
        .add_or_update_network(ProfileDraft::eap("corp", changed), SETTINGS, None)
        .unwrap_err();
    assert!(matches!(err, CoreError::KeyStoreUpdateFailed { .. }));

    let stored = h.repo.configured_network_with_password(id).unwrap();
    assert_eq!(stored.enterprise.unwrap().identity, "alice");

    let err = h
        .repo
        .add_or_update_network(ProfileDraft::eap("lab", EnterpriseConfig::default()), SETTINGS, None)
        .unwrap_err();
    assert!(matches!(err, CoreError::KeyStoreUpdateFailed { .. }));
    assert_eq!(h.repo.network_count(), 1);
}

// ── Permissions ─────────────────────────────────────────────────────

#[test]
fn only_creator_or_privileged_callers_modify() {
    let mut h = harness().build();
    h.repo
        .add_or_update_network(ProfileDraft::psk("home", "password1"), APP, None)
        .unwrap();

    let err = h
        .repo
        .add_or_update_network(ProfileDraft::psk("home", "password2"), OTHER_APP, None)
        .unwrap_err();
    assert!(matches!(err, CoreError::PermissionDenied { .. }));

    assert!(
        h.repo
            .add_or_update_network(ProfileDraft::psk("home", "password2"), SETTINGS, None)
            .is_ok()
    );
    assert!(matches!(
        h.repo.remove_network(NetworkId::new(0), OTHER_APP),
        Err(CoreError::PermissionDenied { .. })
    ));
    h.repo.remove_network(NetworkId::new(0), APP).unwrap();
    assert_eq!(h.repo.network_count(), 0);
}

#[test]
fn device_owner_lockdown_blocks_settings() {
    let mut h = harness().build();
    let id = h
        .repo
        .add_or_update_network(ProfileDraft::psk("corp", "password1"), DEVICE_OWNER, None)
        .unwrap()
        .network_id;

    h.permissions.lockdown.store(true, Ordering::SeqCst);
    assert!(matches!(
        h.repo.disable_network(id, SETTINGS),
        Err(CoreError::PermissionDenied { .. })
    ));
    assert!(h.repo.disable_network(id, DEVICE_OWNER).is_ok());

    h.permissions.lockdown.store(false, Ordering::SeqCst);
    assert!(h.repo.enable_network(id, false, SETTINGS).is_ok());
    assert!(matches!(
        h.repo.enable_network(id, false, APP),
        Err(CoreError::PermissionDenied { .. })
    ));
}

#[test]
fn background_user_apps_cannot_create() {
    let mut h = harness().build();
    let err = h
        .repo
        .add_or_update_network(ProfileDraft::open("cafe"), common::GUEST_APP, None)
        .unwrap_err();
    assert!(matches!(err, CoreError::PermissionDenied { .. }));
}

#[test]
fn proxy_changes_need_an_administrative_caller() {
    let mut h = harness().build();
    let with_proxy = |ssid: &str| ProfileDraft {
        ip_configuration: Some(IpConfiguration::dhcp().with_proxy(ProxySettings::Pac {
            url: "http://wpad/wpad.dat".into(),
        })),
        ..ProfileDraft::open(ssid)
    };

    assert!(matches!(
        h.repo.add_or_update_network(with_proxy("cafe"), APP, None),
        Err(CoreError::PermissionDenied { .. })
    ));

    let result = h
        .repo
        .add_or_update_network(with_proxy("office"), PROFILE_OWNER, None)
        .unwrap();
    assert!(result.proxy_changed);

    let plain = h
        .repo
        .add_or_update_network(ProfileDraft::open("plain"), APP, None)
        .unwrap();
    assert!(!plain.proxy_changed);
}

#[test]
fn mac_randomization_setting_needs_settings_or_wizard() {
    let mut h = harness().build();
    let draft = || ProfileDraft {
        mac_randomization_setting: Some(MacRandomizationSetting::None),
        ..ProfileDraft::open("cafe")
    };

    assert!(matches!(
        h.repo.add_or_update_network(draft(), APP, None),
        Err(CoreError::PermissionDenied { .. })
    ));
    assert!(matches!(
        h.repo.add_or_update_network(draft(), DEVICE_OWNER, None),
        Err(CoreError::PermissionDenied { .. })
    ));
    let id = h
        .repo
        .add_or_update_network(draft(), WIZARD, None)
        .unwrap()
        .network_id;
    assert_eq!(
        h.repo.configured_network_with_password(id).unwrap().mac_randomization_setting,
        MacRandomizationSetting::None
    );
}

// ── Masking tiers ───────────────────────────────────────────────────

#[test]
fn reads_mask_according_to_caller() {
    let mut h = harness().build();
    let id = h
        .repo
        .add_or_update_network(ProfileDraft::psk("home", "password1"), APP, None)
        .unwrap()
        .network_id;
    let mac = MacAddress::new("02:11:22:33:44:01");

    let stranger = h.repo.configured_network(id, OTHER_APP).unwrap();
    assert_eq!(stranger.pre_shared_key, Some(Credential::mask()));
    assert!(stranger.randomized_mac.is_placeholder());

    let creator = h.repo.configured_network(id, APP).unwrap();
    assert_eq!(creator.pre_shared_key, Some(Credential::mask()));
    assert_eq!(creator.randomized_mac, mac);

    let settings = h.repo.configured_network(id, SETTINGS).unwrap();
    assert_eq!(settings.pre_shared_key, Some(Credential::new("\"password1\"")));
    assert_eq!(settings.randomized_mac, mac);

    assert_eq!(
        h.repo.configured_networks_with_passwords()[0].pre_shared_key,
        Some(Credential::new("\"password1\""))
    );
}

#[test]
fn saved_networks_skip_ephemeral_and_passpoint() {
    let mut h = harness().build();
    h.repo
        .add_or_update_network(ProfileDraft::open("home"), APP, None)
        .unwrap();
    let ephemeral = ProfileDraft {
        ephemeral: Some(true),
        ..ProfileDraft::open("cafe")
    };
    h.repo.add_or_update_network(ephemeral, APP, None).unwrap();
    let passpoint = ProfileDraft {
        passpoint: Some(true),
        fqdn: Some("example.com".into()),
        ..ProfileDraft::eap("hotspot", EnterpriseConfig::default())
    };
    h.repo
        .add_or_update_network(passpoint, Uid::SYSTEM, None)
        .unwrap();

    let saved: Vec<String> = h
        .repo
        .saved_networks(APP)
        .into_iter()
        .map(|p| p.ssid)
        .collect();
    assert_eq!(saved, vec!["\"home\"".to_owned()]);
    assert_eq!(h.repo.configured_networks(APP).len(), 3);
    assert_eq!(h.listener.take(), vec!["added:0".to_owned()]);
}

#[test]
fn unsupported_randomization_reads_as_none() {
    let config = wlanstore_core::RepositoryConfig {
        mac_randomization_supported: false,
        ..wlanstore_core::RepositoryConfig::default()
    };
    let mut h = harness().config(config).build();
    let id = h
        .repo
        .add_or_update_network(ProfileDraft::open("cafe"), APP, None)
        .unwrap()
        .network_id;
    assert_eq!(
        h.repo.configured_network(id, APP).unwrap().mac_randomization_setting,
        MacRandomizationSetting::None
    );
    assert_eq!(
        h.repo.configured_network_without_masking(id).unwrap().mac_randomization_setting,
        MacRandomizationSetting::Persistent
    );
}

// ── Remove / re-add ─────────────────────────────────────────────────

#[test]
fn remove_clears_references_and_keeps_the_mac() {
    let mut h = harness().build();
    let home = h
        .repo
        .add_or_update_network(ProfileDraft::psk("home", "password1"), APP, None)
        .unwrap()
        .network_id;
    let work = h
        .repo
        .add_or_update_network(ProfileDraft::open("work"), APP, None)
        .unwrap()
        .network_id;
    h.repo
        .set_network_connect_choice(work, "\"home\"WPA_PSK")
        .unwrap();
    h.repo.enable_network(home, false, APP).unwrap();
    assert_eq!(h.repo.last_selected_network_id(), home);
    h.listener.take();

    h.repo.remove_network(home, APP).unwrap();
    assert_eq!(h.listener.take(), vec!["removed:0".to_owned()]);
    assert!(h.repo.configured_network(home, SETTINGS).is_none());
    assert_eq!(h.repo.last_selected_network_id(), NetworkId::INVALID);
    let work_profile = h.repo.configured_network_with_password(work).unwrap();
    assert_eq!(work_profile.selection.connect_choice, None);

    let again = h
        .repo
        .add_or_update_network(ProfileDraft::psk("home", "password1"), APP, None)
        .unwrap();
    assert_eq!(again.network_id, NetworkId::new(2));
    let readded = h.repo.configured_network_with_password(again.network_id).unwrap();
    assert_eq!(readded.randomized_mac, MacAddress::new("02:11:22:33:44:01"));
    assert_eq!(h.mac_calls.load(Ordering::SeqCst), 2);
}

// ── Enable / disable ────────────────────────────────────────────────

#[test]
fn enable_with_disable_others() {
    let mut h = harness().build();
    let a = h
        .repo
        .add_or_update_network(ProfileDraft::open("a"), APP, None)
        .unwrap()
        .network_id;
    let b = h
        .repo
        .add_or_update_network(ProfileDraft::open("b"), APP, None)
        .unwrap()
        .network_id;
    h.repo.enable_network(b, false, APP).unwrap();
    h.clock.advance(1_000);

    h.repo.enable_network(a, true, APP).unwrap();
    assert_eq!(h.repo.last_selected_network_id(), a);
    assert_eq!(h.repo.last_selected_network_config_key(), Some("\"a\"NONE"));
    assert_eq!(h.repo.last_selected_time_ms(), Some(1_000));

    let a_profile = h.repo.configured_network_with_password(a).unwrap();
    let b_profile = h.repo.configured_network_with_password(b).unwrap();
    assert_eq!(a_profile.status, NetworkStatus::Enabled);
    assert_eq!(b_profile.status, NetworkStatus::Disabled);
}

#[test]
fn unauthorized_enable_still_records_last_selection() {
    let mut h = harness().build();
    let id = h
        .repo
        .add_or_update_network(ProfileDraft::open("a"), APP, None)
        .unwrap()
        .network_id;

    assert!(h.repo.enable_network(id, false, OTHER_APP).is_err());
    assert_eq!(h.repo.last_selected_network_id(), id);
    assert_eq!(
        h.repo.configured_network_with_password(id).unwrap().status,
        NetworkStatus::Disabled
    );

    assert!(h.repo.disable_network(id, OTHER_APP).is_err());
    assert_eq!(h.repo.last_selected_network_id(), NetworkId::INVALID);
}

#[test]
fn disable_is_permanent_by_user() {
    let mut h = harness().build();
    let id = h
        .repo
        .add_or_update_network(ProfileDraft::open("a"), APP, None)
        .unwrap()
        .network_id;
    h.listener.take();

    h.repo.disable_network(id, APP).unwrap();
    let profile = h.repo.configured_network_with_password(id).unwrap();
    assert!(profile.selection.is_permanently_disabled());
    assert_eq!(
        profile.selection.disable_reason(),
        Some(wlanstore_core::DisableReason::ByWifiManager)
    );
    assert_eq!(h.listener.take(), vec!["perm_disabled(by_wifi_manager):0".to_owned()]);

    h.repo.enable_network(id, false, APP).unwrap();
    assert!(
        h.repo
            .configured_network_with_password(id)
            .unwrap()
            .selection
            .is_enabled()
    );
}

// ── Dump ────────────────────────────────────────────────────────────

#[test]
fn dump_masks_credentials_only() {
    let mut h = harness().build();
    h.repo
        .add_or_update_network(ProfileDraft::psk("home", "password1"), APP, None)
        .unwrap();
    let cafe = h
        .repo
        .add_or_update_network(ProfileDraft::open("cafe"), APP, None)
        .unwrap()
        .network_id;
    h.repo.enable_network(cafe, false, APP).unwrap();

    let dump = h.repo.dump();
    let text = dump
        .profiles
        .iter()
        .map(|p| {
            format!(
                "{} {} psk={} mac={} status={}",
                p.network_id,
                p.config_key(),
                p.pre_shared_key.as_ref().map_or("-", Credential::expose),
                p.randomized_mac,
                p.status,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(text, @r#"
    0 "home"WPA_PSK psk=* mac=02:11:22:33:44:01 status=disabled
    1 "cafe"NONE psk=- mac=02:11:22:33:44:02 status=enabled
    "#);

    assert_eq!(dump.next_network_id, 2);
    assert_eq!(dump.last_selected.unwrap().network_id, cafe);
    assert!(dump.loaded);
}
