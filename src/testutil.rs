//! Test doubles: a scripted radio command spy and a recording timer service.

use crate::{
    AdvertisingSetup, BleAddress, ConnectionSetup, DisconnectionReason, GapTimer,
    RadioCommandPort, ScanSetup, TimerService, VendorStatus,
};
use heapless::Vec;

/// One issued radio command, recorded in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmd {
    SetAdvertisingParameters,
    SetAdvertisingData,
    SetScanResponseData,
    AdvertisingEnable(bool),
    StartObservation,
    TerminateObservation,
    CreateConnection,
    TerminateConnection,
    ConfigureWhitelist,
    SetRandomAddress,
    WritePublicAddress,
    ReadPublicAddress,
    SetTxPower,
    UpdateAppearance,
}

/// Radio port spy with per-command scripted statuses (all success by
/// default).
pub struct FakeRadio {
    pub issued: Vec<Cmd, 32>,
    pub adv_params_status: VendorStatus,
    pub adv_data_status: VendorStatus,
    pub scan_response_status: VendorStatus,
    pub adv_enable_status: VendorStatus,
    pub observation_status: VendorStatus,
    pub terminate_observation_status: VendorStatus,
    pub create_connection_status: VendorStatus,
    pub terminate_connection_status: VendorStatus,
    pub whitelist_status: VendorStatus,
    pub random_address_status: VendorStatus,
    pub write_public_status: VendorStatus,
    pub read_public_status: VendorStatus,
    pub tx_power_status: VendorStatus,
    pub appearance_status: VendorStatus,
    pub public_address: Option<BleAddress>,
    pub last_advertising_setup: Option<AdvertisingSetup>,
    pub last_scan_setup: Option<ScanSetup>,
    pub last_connection_setup: Option<ConnectionSetup>,
    pub last_disconnection: Option<(u16, DisconnectionReason)>,
    pub last_appearance: Option<u16>,
    pub last_tx_power: Option<(bool, u8)>,
}

impl FakeRadio {
    pub fn new() -> Self {
        Self {
            issued: Vec::new(),
            adv_params_status: VendorStatus::Success,
            adv_data_status: VendorStatus::Success,
            scan_response_status: VendorStatus::Success,
            adv_enable_status: VendorStatus::Success,
            observation_status: VendorStatus::Success,
            terminate_observation_status: VendorStatus::Success,
            create_connection_status: VendorStatus::Success,
            terminate_connection_status: VendorStatus::Success,
            whitelist_status: VendorStatus::Success,
            random_address_status: VendorStatus::Success,
            write_public_status: VendorStatus::Success,
            read_public_status: VendorStatus::Success,
            tx_power_status: VendorStatus::Success,
            appearance_status: VendorStatus::Success,
            public_address: None,
            last_advertising_setup: None,
            last_scan_setup: None,
            last_connection_setup: None,
            last_disconnection: None,
            last_appearance: None,
            last_tx_power: None,
        }
    }

    pub fn count(&self, cmd: Cmd) -> usize {
        self.issued.iter().filter(|&&c| c == cmd).count()
    }
}

impl Default for FakeRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioCommandPort for FakeRadio {
    async fn set_advertising_parameters(&mut self, setup: &AdvertisingSetup) -> VendorStatus {
        self.issued.push(Cmd::SetAdvertisingParameters).ok();
        self.last_advertising_setup = Some(*setup);
        self.adv_params_status
    }

    async fn set_advertising_data(&mut self, _data: &[u8]) -> VendorStatus {
        self.issued.push(Cmd::SetAdvertisingData).ok();
        self.adv_data_status
    }

    async fn set_scan_response_data(&mut self, _data: &[u8]) -> VendorStatus {
        self.issued.push(Cmd::SetScanResponseData).ok();
        self.scan_response_status
    }

    async fn set_advertising_enable(&mut self, enable: bool) -> VendorStatus {
        self.issued.push(Cmd::AdvertisingEnable(enable)).ok();
        self.adv_enable_status
    }

    async fn start_observation(&mut self, setup: &ScanSetup) -> VendorStatus {
        self.issued.push(Cmd::StartObservation).ok();
        self.last_scan_setup = Some(*setup);
        self.observation_status
    }

    async fn terminate_observation(&mut self) -> VendorStatus {
        self.issued.push(Cmd::TerminateObservation).ok();
        self.terminate_observation_status
    }

    async fn create_connection(&mut self, setup: &ConnectionSetup) -> VendorStatus {
        self.issued.push(Cmd::CreateConnection).ok();
        self.last_connection_setup = Some(*setup);
        self.create_connection_status
    }

    async fn terminate_connection(
        &mut self,
        handle: u16,
        reason: DisconnectionReason,
    ) -> VendorStatus {
        self.issued.push(Cmd::TerminateConnection).ok();
        self.last_disconnection = Some((handle, reason));
        self.terminate_connection_status
    }

    async fn configure_whitelist(&mut self, _entries: &[BleAddress]) -> VendorStatus {
        self.issued.push(Cmd::ConfigureWhitelist).ok();
        self.whitelist_status
    }

    async fn set_random_address(&mut self, _address: BleAddress) -> VendorStatus {
        self.issued.push(Cmd::SetRandomAddress).ok();
        self.random_address_status
    }

    async fn write_public_address(&mut self, _address: BleAddress) -> VendorStatus {
        self.issued.push(Cmd::WritePublicAddress).ok();
        self.write_public_status
    }

    async fn read_public_address(&mut self) -> (VendorStatus, Option<BleAddress>) {
        self.issued.push(Cmd::ReadPublicAddress).ok();
        (self.read_public_status, self.public_address)
    }

    async fn set_tx_power(&mut self, enable_high_power: bool, pa_level: u8) -> VendorStatus {
        self.issued.push(Cmd::SetTxPower).ok();
        self.last_tx_power = Some((enable_high_power, pa_level));
        self.tx_power_status
    }

    async fn update_appearance_characteristic(&mut self, appearance: u16) -> VendorStatus {
        self.issued.push(Cmd::UpdateAppearance).ok();
        self.last_appearance = Some(appearance);
        self.appearance_status
    }
}

/// Timer service spy recording attach/detach calls in order.
#[derive(Debug, Default)]
pub struct FakeTimer {
    pub attached: Vec<(GapTimer, u32), 8>,
    pub detached: Vec<GapTimer, 8>,
}

impl FakeTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_attached(&self) -> Option<(GapTimer, u32)> {
        self.attached.last().copied()
    }
}

impl TimerService for FakeTimer {
    fn attach(&mut self, timer: GapTimer, duration_ms: u32) {
        self.attached.push((timer, duration_ms)).ok();
    }

    fn detach(&mut self, timer: GapTimer) {
        self.detached.push(timer).ok();
    }
}
