//! GAP role controller
//!
//! [`GapController`] owns the radio command port and the timer service and
//! drives the advertiser, scanner and initiator roles over them. It is built
//! for a single-threaded executor: every operation is an async method that
//! resolves when the underlying radio command round-trip completes, and
//! nothing in here blocks.
//!
//! Timer expiry and radio events are fed in from the outside.
//! [`GapController::timeout_elapsed`] only queues work and is safe to call
//! from restricted callback contexts; the queued work is performed by
//! [`GapController::process_events`] on the executor.

use crate::{
    AddressManager, AddressType, AdvertisementReport, AdvertisingData, AdvertisingParams,
    AdvertisingPolicyMode, AdvertisingSetup, AdvertisingType, BleAddress, ConnectionParams,
    ConnectionSetup, DisconnectionReason, DiscoveryReason, GapError, GapRole, GapState, GapTimer,
    RadioCommandPort, RadioEvent, ScanSetup, ScanningParams, ScanningPolicyMode, TimerService,
    VendorStatus,
    adv_data::AdType,
    constants::{
        ADV_CHANNEL_MAP_ALL, ADV_INTERVAL_MAX, ADV_INTERVAL_MIN, ADV_INTERVAL_MIN_NONCON,
        ADV_TIMEOUT_MAX_S, CONN_EVENT_LENGTH, DEFAULT_CONN_INTERVAL, DEFERRED_QUEUE_DEPTH,
        GUARD_INTERVAL_MS, INVALID_CONNECTION_HANDLE, MAX_WHITELIST_ENTRIES, SCAN_INTERVAL_MIN,
        SUPERVISION_TIMEOUT, conn_units_to_ms, ms_to_time_units, time_units_to_ms,
    },
    filter::{classify_pdu, should_drop},
};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

/// Work queued by `timeout_elapsed` for later execution on the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredEvent {
    AdvertisingTimeout,
    ScanTimeout,
    ConnectionDelayElapsed,
}

/// Map a TX power level in dBm onto the radio's power amplifier table.
///
/// Returns the high-power flag and PA level for the exact output powers the
/// amplifier supports; anything else is unavailable.
fn pa_level_for_dbm(dbm: i8) -> Option<(bool, u8)> {
    match dbm {
        -18 => Some((false, 0)),
        -15 => Some((false, 1)),
        -12 => Some((false, 2)),
        -11 => Some((true, 1)),
        -9 => Some((false, 3)),
        -8 => Some((true, 2)),
        -6 => Some((false, 4)),
        -4 => Some((true, 3)),
        -2 => Some((false, 5)),
        -1 => Some((true, 4)),
        0 => Some((false, 6)),
        2 => Some((true, 5)),
        4 => Some((true, 6)),
        5 => Some((false, 7)),
        8 => Some((true, 7)),
        _ => None,
    }
}

/// GAP role controller over a radio command port and a timer service
///
/// One instance per radio. Applications drive it from three directions:
/// operations (`start_advertising`, `connect`, ...), radio events
/// ([`Self::handle_event`]) and timer expiry
/// ([`Self::timeout_elapsed`] followed by [`Self::process_events`]).
pub struct GapController<P: RadioCommandPort, T: TimerService> {
    radio: P,
    timers: T,
    state: GapState,
    role: GapRole,
    advertising_policy: AdvertisingPolicyMode,
    scanning_policy: ScanningPolicyMode,
    whitelist: Vec<BleAddress, MAX_WHITELIST_ENTRIES>,
    addresses: AddressManager,
    advertising_payload: AdvertisingData,
    scan_response_payload: AdvertisingData,
    appearance: u16,
    requested_adv_interval: u16,
    adv_interval: u16,
    scan_interval: u16,
    scan_window: u16,
    scan_timeout_s: u16,
    active_scanning: bool,
    conn_interval_min: u16,
    conn_interval_max: u16,
    peer_address_type: AddressType,
    peer_address: BleAddress,
    connection_handle: u16,
    deferred: Channel<NoopRawMutex, DeferredEvent, DEFERRED_QUEUE_DEPTH>,
}

impl<P: RadioCommandPort, T: TimerService> GapController<P, T> {
    /// Create an idle controller around the given radio port and timer
    /// service.
    pub fn new(radio: P, timers: T) -> Self {
        Self {
            radio,
            timers,
            state: GapState::default(),
            role: GapRole::default(),
            advertising_policy: AdvertisingPolicyMode::default(),
            scanning_policy: ScanningPolicyMode::default(),
            whitelist: Vec::new(),
            addresses: AddressManager::new(),
            advertising_payload: AdvertisingData::new(),
            scan_response_payload: AdvertisingData::new(),
            appearance: 0,
            requested_adv_interval: ADV_INTERVAL_MIN,
            adv_interval: ADV_INTERVAL_MIN,
            scan_interval: SCAN_INTERVAL_MIN,
            scan_window: SCAN_INTERVAL_MIN,
            scan_timeout_s: 0,
            active_scanning: false,
            conn_interval_min: DEFAULT_CONN_INTERVAL,
            conn_interval_max: DEFAULT_CONN_INTERVAL,
            peer_address_type: AddressType::Public,
            peer_address: BleAddress::new([0; 6]),
            connection_handle: INVALID_CONNECTION_HANDLE,
            deferred: Channel::new(),
        }
    }

    /// Current role flags.
    #[must_use]
    pub fn state(&self) -> GapState {
        self.state
    }

    /// Handle of the established connection, or the invalid sentinel.
    #[must_use]
    pub fn connection_handle(&self) -> u16 {
        self.connection_handle
    }

    /// The configured GAP role.
    #[must_use]
    pub fn gap_role(&self) -> GapRole {
        self.role
    }

    /// Configure the GAP role of the local device.
    pub fn set_gap_role(&mut self, role: GapRole) {
        self.role = role;
    }

    /// Borrow the radio command port.
    pub fn radio(&self) -> &P {
        &self.radio
    }

    /// Mutably borrow the radio command port.
    pub fn radio_mut(&mut self) -> &mut P {
        &mut self.radio
    }

    /// Borrow the timer service.
    pub fn timer_service(&self) -> &T {
        &self.timers
    }

    // ------------------------------------------------------------------
    // Advertiser role

    /// Start advertising with the given parameters.
    ///
    /// Parameters are validated before any radio command is issued. The
    /// advertising interval floor depends on the advertising type; the
    /// non-connectable type has a higher one. When a whitelist policy other
    /// than [`AdvertisingPolicyMode::IgnoreWhitelist`] is active, the stored
    /// whitelist is pushed to the radio first and a push failure aborts the
    /// whole sequence.
    ///
    /// A non-zero timeout arms the advertising timer; expiry stops
    /// advertising via the deferred event queue.
    ///
    /// # Errors
    ///
    /// - [`GapError::NotImplemented`] for directed advertising
    /// - [`GapError::ParamOutOfRange`] when the interval or timeout is out of
    ///   range
    /// - [`GapError::OperationNotPermitted`] when the whitelist push fails
    /// - [`GapError::StackBusy`] when the scan response push times out
    /// - [`GapError::InvalidParam`] when the radio rejects the advertising
    ///   parameters
    /// - [`GapError::Unspecified`] for other radio failures
    pub async fn start_advertising(&mut self, params: &AdvertisingParams) -> Result<(), GapError> {
        let advertising_type = params.advertising_type();
        if advertising_type == AdvertisingType::ConnectableDirected {
            // needs a security manager to resolve the initiator address
            return Err(GapError::NotImplemented);
        }

        let interval_min = match advertising_type {
            AdvertisingType::NonConnectableUndirected => ADV_INTERVAL_MIN_NONCON,
            _ => ADV_INTERVAL_MIN,
        };
        if params.interval() < interval_min || params.interval() > ADV_INTERVAL_MAX {
            return Err(GapError::ParamOutOfRange);
        }
        if params.timeout() > ADV_TIMEOUT_MAX_S {
            return Err(GapError::ParamOutOfRange);
        }

        if self.advertising_policy != AdvertisingPolicyMode::IgnoreWhitelist {
            let status = self.radio.configure_whitelist(&self.whitelist).await;
            if !status.is_success() {
                warn!("[GAP] whitelist push rejected: {}", status as u8);
                return Err(GapError::OperationNotPermitted);
            }
        }

        if advertising_type.supports_scan_response() {
            let status = self
                .radio
                .set_scan_response_data(self.scan_response_payload.payload())
                .await;
            if !status.is_success() {
                return Err(match status {
                    VendorStatus::Timeout => GapError::StackBusy,
                    _ => GapError::Unspecified,
                });
            }
        } else {
            // this type never answers scan requests; clear any stale payload
            // and carry on regardless of the outcome
            let _ = self.radio.set_scan_response_data(&[]).await;
        }

        let status = self
            .radio
            .set_advertising_data(self.advertising_payload.payload())
            .await;
        if !status.is_success() {
            return Err(GapError::Unspecified);
        }

        self.requested_adv_interval = params.interval();
        self.update_advertising_interval();

        // The radio wants min < max. Stay below the requested interval at the
        // ceiling, above it everywhere else.
        let interval_min = if self.adv_interval >= ADV_INTERVAL_MAX {
            self.adv_interval - 1
        } else {
            self.adv_interval
        };
        let setup = AdvertisingSetup {
            interval_min,
            interval_max: interval_min + 1,
            advertising_type,
            own_address_type: self.addresses.address_type(),
            filter_policy: self.advertising_policy.into(),
            channel_map: ADV_CHANNEL_MAP_ALL,
        };
        if !self.radio.set_advertising_parameters(&setup).await.is_success() {
            return Err(GapError::InvalidParam);
        }

        if !self.radio.set_advertising_enable(true).await.is_success() {
            return Err(GapError::Unspecified);
        }
        self.state.advertising = true;
        debug!("[GAP] advertising, interval {} units", interval_min);

        if params.timeout() != 0 {
            self.timers
                .attach(GapTimer::Advertising, u32::from(params.timeout()) * 1000);
        }
        Ok(())
    }

    /// Stop advertising. Does nothing when advertising is not enabled.
    ///
    /// # Errors
    ///
    /// [`GapError::OperationNotPermitted`] when the radio refuses to disable
    /// advertising; the role flag is left set.
    pub async fn stop_advertising(&mut self) -> Result<(), GapError> {
        if !self.state.advertising {
            return Ok(());
        }
        if !self.radio.set_advertising_enable(false).await.is_success() {
            return Err(GapError::OperationNotPermitted);
        }
        self.state.advertising = false;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scanner role

    /// Start the observation procedure with the given scanning parameters.
    ///
    /// A non-zero timeout arms the scanning timer; expiry stops the scan via
    /// the deferred event queue.
    ///
    /// # Errors
    ///
    /// - [`GapError::OperationNotPermitted`] when the scanning policy filters
    ///   on an empty whitelist; no command is issued
    /// - [`GapError::NotImplemented`] when this radio variant lacks the
    ///   observer role
    /// - [`GapError::Unspecified`] for other radio failures
    pub async fn start_scan(&mut self, params: &ScanningParams) -> Result<(), GapError> {
        if self.scanning_policy == ScanningPolicyMode::FilterAllAdvertisements
            && self.whitelist.is_empty()
        {
            return Err(GapError::OperationNotPermitted);
        }

        self.scan_interval = params.interval();
        self.scan_window = params.window();
        self.scan_timeout_s = params.timeout();
        self.active_scanning = params.active();

        let setup = ScanSetup {
            active: self.active_scanning,
            interval: self.scan_interval,
            window: self.scan_window,
            own_address_type: self.addresses.address_type(),
        };
        let status = self.radio.start_observation(&setup).await;
        if !status.is_success() {
            error!("[SCAN] observation start failed: {}", status as u8);
            return Err(match status {
                VendorStatus::InvalidCid => GapError::NotImplemented,
                _ => GapError::Unspecified,
            });
        }
        self.state.scanning = true;

        if self.scan_timeout_s != 0 {
            self.timers
                .attach(GapTimer::Scanning, u32::from(self.scan_timeout_s) * 1000);
        }
        Ok(())
    }

    /// Stop the observation procedure. Does nothing when not scanning.
    ///
    /// # Errors
    ///
    /// [`GapError::Unspecified`] when the radio refuses to terminate the
    /// procedure; the role flag is left set.
    pub async fn stop_scan(&mut self) -> Result<(), GapError> {
        if !self.state.scanning {
            return Ok(());
        }
        if !self.radio.terminate_observation().await.is_success() {
            return Err(GapError::Unspecified);
        }
        self.state.scanning = false;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Initiator role

    /// Connect to the given peer.
    ///
    /// Preferred connection parameters are accepted for interface parity but
    /// not negotiated; the intervals configured via
    /// [`Self::set_connection_interval`] are used instead.
    ///
    /// When a scan is running it is terminated first and the connection is
    /// created after the discovery-complete event, one scan interval later.
    /// Otherwise the connection is created immediately.
    ///
    /// # Errors
    ///
    /// [`GapError::Unspecified`] when a radio command fails. A failed
    /// create-connection command leaves the `connecting` flag set; call
    /// [`Self::reset`] to recover.
    pub async fn connect(
        &mut self,
        peer_address: BleAddress,
        peer_address_type: AddressType,
        _connection_params: Option<&ConnectionParams>,
        scan_params: &ScanningParams,
    ) -> Result<(), GapError> {
        self.scan_interval = scan_params.interval();
        self.scan_window = scan_params.window();
        self.scan_timeout_s = scan_params.timeout();
        self.active_scanning = scan_params.active();
        self.peer_address = peer_address;
        self.peer_address_type = peer_address_type;
        self.state.connecting = true;

        if self.state.scanning {
            // finish in handle_event once the radio confirms the scan ended
            self.stop_scan().await?;
            return Ok(());
        }
        self.create_connection().await
    }

    async fn create_connection(&mut self) -> Result<(), GapError> {
        let setup = ConnectionSetup {
            scan_interval: self.scan_interval,
            scan_window: self.scan_window,
            peer_address_type: self.peer_address_type,
            peer_address: self.peer_address,
            own_address_type: self.addresses.address_type(),
            conn_interval_min: self.conn_interval_min,
            conn_interval_max: self.conn_interval_max,
            conn_latency: 0,
            supervision_timeout: SUPERVISION_TIMEOUT,
            conn_length_min: CONN_EVENT_LENGTH,
            conn_length_max: CONN_EVENT_LENGTH,
        };
        let status = self.radio.create_connection(&setup).await;
        if !status.is_success() {
            error!("[GAP] create connection failed: {}", status as u8);
            return Err(GapError::Unspecified);
        }
        self.state.connecting = false;
        Ok(())
    }

    /// Terminate the established connection.
    ///
    /// # Errors
    ///
    /// - [`GapError::InvalidState`] when no connection is established
    /// - [`GapError::OperationNotPermitted`] when the radio disallows the
    ///   command in its current state
    /// - [`GapError::StackBusy`] when the command times out
    /// - [`GapError::Unspecified`] for other radio failures
    pub async fn disconnect(&mut self, reason: DisconnectionReason) -> Result<(), GapError> {
        if self.connection_handle == INVALID_CONNECTION_HANDLE {
            return Err(GapError::InvalidState);
        }
        self.disconnect_handle(self.connection_handle, reason).await
    }

    /// Terminate the connection identified by `handle`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::disconnect`], minus the state check.
    pub async fn disconnect_handle(
        &mut self,
        handle: u16,
        reason: DisconnectionReason,
    ) -> Result<(), GapError> {
        match self.radio.terminate_connection(handle, reason).await {
            VendorStatus::Success => Ok(()),
            VendorStatus::CommandDisallowed => Err(GapError::OperationNotPermitted),
            VendorStatus::Timeout => Err(GapError::StackBusy),
            _ => Err(GapError::Unspecified),
        }
    }

    // ------------------------------------------------------------------
    // Payload and characteristic plumbing

    /// Set the advertising and scan response payloads.
    ///
    /// Both payloads are cached; while advertising is enabled they are also
    /// pushed to the radio immediately. Two element types get extra
    /// treatment: a TX power level element adjusts the power amplifier when
    /// the radio supports the requested output power, and an appearance
    /// element updates the GATT appearance characteristic.
    ///
    /// # Errors
    ///
    /// - [`GapError::StackBusy`] when the live scan response push times out
    /// - [`GapError::Unspecified`] when a live push fails otherwise
    pub async fn set_advertising_data(
        &mut self,
        advertising: &AdvertisingData,
        scan_response: &AdvertisingData,
    ) -> Result<(), GapError> {
        for unit in advertising.units() {
            if unit.is(AdType::TxPowerLevel) && !unit.data.is_empty() {
                let dbm = unit.data[0] as i8;
                if let Some((high_power, pa_level)) = pa_level_for_dbm(dbm) {
                    let status = self.radio.set_tx_power(high_power, pa_level).await;
                    if !status.is_success() {
                        warn!("[GAP] tx power update failed: {}", status as u8);
                    }
                }
            }
        }
        if let Some(appearance) = advertising.appearance() {
            self.appearance = appearance;
            let status = self
                .radio
                .update_appearance_characteristic(self.appearance)
                .await;
            if !status.is_success() {
                warn!("[GAP] appearance update failed: {}", status as u8);
            }
        }

        if self.state.advertising {
            let status = self
                .radio
                .set_scan_response_data(scan_response.payload())
                .await;
            if !status.is_success() {
                return Err(match status {
                    VendorStatus::Timeout => GapError::StackBusy,
                    _ => GapError::Unspecified,
                });
            }
            let status = self.radio.set_advertising_data(advertising.payload()).await;
            if !status.is_success() {
                return Err(GapError::Unspecified);
            }
        }

        self.advertising_payload = advertising.clone();
        self.scan_response_payload = scan_response.clone();
        Ok(())
    }

    /// Update the GATT appearance characteristic.
    ///
    /// # Errors
    ///
    /// The radio status translated through [`VendorStatus::to_result`].
    pub async fn set_appearance(&mut self, appearance: u16) -> Result<(), GapError> {
        self.appearance = appearance;
        self.radio
            .update_appearance_characteristic(self.appearance)
            .await
            .to_result()
    }

    /// Set the local device address.
    ///
    /// # Errors
    ///
    /// See [`AddressManager::set_address`].
    pub async fn set_address(
        &mut self,
        address_type: AddressType,
        address: BleAddress,
    ) -> Result<(), GapError> {
        self.addresses
            .set_address(&mut self.radio, address_type, address)
            .await
    }

    /// Get the local device address for the active type.
    ///
    /// # Errors
    ///
    /// See [`AddressManager::get_address`].
    pub async fn get_address(&mut self) -> Result<(AddressType, BleAddress), GapError> {
        self.addresses.get_address(&mut self.radio).await
    }

    // ------------------------------------------------------------------
    // Whitelist and policies

    /// Replace the stored whitelist.
    ///
    /// The list is pushed to the radio when an advertising or scanning
    /// procedure that uses it starts.
    ///
    /// # Errors
    ///
    /// [`GapError::ParamOutOfRange`] when `entries` exceeds the capacity.
    pub fn set_whitelist(&mut self, entries: &[BleAddress]) -> Result<(), GapError> {
        if entries.len() > MAX_WHITELIST_ENTRIES {
            return Err(GapError::ParamOutOfRange);
        }
        self.whitelist.clear();
        self.whitelist.extend_from_slice(entries).ok();
        Ok(())
    }

    /// The stored whitelist.
    #[must_use]
    pub fn whitelist(&self) -> &[BleAddress] {
        &self.whitelist
    }

    /// Maximum number of whitelist entries.
    #[must_use]
    pub fn max_whitelist_size(&self) -> usize {
        MAX_WHITELIST_ENTRIES
    }

    /// Set the whitelist policy applied when advertising starts.
    pub fn set_advertising_policy_mode(&mut self, mode: AdvertisingPolicyMode) {
        self.advertising_policy = mode;
    }

    /// The whitelist policy applied when advertising starts.
    #[must_use]
    pub fn advertising_policy_mode(&self) -> AdvertisingPolicyMode {
        self.advertising_policy
    }

    /// Set the whitelist policy applied when scanning starts.
    pub fn set_scanning_policy_mode(&mut self, mode: ScanningPolicyMode) {
        self.scanning_policy = mode;
    }

    /// The whitelist policy applied when scanning starts.
    #[must_use]
    pub fn scanning_policy_mode(&self) -> ScanningPolicyMode {
        self.scanning_policy
    }

    // ------------------------------------------------------------------
    // Connection interval

    /// Set the connection interval used by subsequent connection attempts,
    /// in 1.25 ms units. Minimum and maximum are pinned to the same value.
    pub fn set_connection_interval(&mut self, interval: u16) {
        self.conn_interval_min = interval;
        self.conn_interval_max = interval;
    }

    /// The minimum connection interval in 1.25 ms units.
    #[must_use]
    pub fn connection_interval(&self) -> u16 {
        self.conn_interval_min
    }

    // ------------------------------------------------------------------
    // Events and timers

    /// Process an asynchronous radio event.
    ///
    /// Advertisement reports survive only when the scanning policy and peer
    /// address type admit them and no connection attempt is in flight; the
    /// decoded report is returned to the caller. All other events mutate
    /// role state and return `None`.
    pub async fn handle_event(&mut self, event: RadioEvent) -> Option<AdvertisementReport> {
        match event {
            RadioEvent::Advertisement(report) => {
                if should_drop(self.scanning_policy, report.peer_address_type) {
                    return None;
                }
                if self.state.connecting {
                    return None;
                }
                let (advertising_type, is_scan_response) = classify_pdu(report.pdu_type);
                Some(AdvertisementReport {
                    reason: DiscoveryReason::DeviceFound,
                    advertising_type,
                    is_scan_response,
                    peer_address_type: report.peer_address_type,
                    peer_address: report.peer_address,
                    data: report.data,
                    rssi: report.rssi,
                })
            }
            RadioEvent::DiscoveryComplete => {
                self.state.scanning = false;
                if self.state.connecting {
                    // the radio needs one scan interval of settling time
                    // before it accepts a create-connection command
                    self.timers.attach(
                        GapTimer::ConnectionDelay,
                        time_units_to_ms(self.scan_interval),
                    );
                }
                None
            }
            RadioEvent::ConnectionComplete { status, handle } => {
                self.state.connecting = false;
                if status.is_success() {
                    self.connection_handle = handle;
                    self.state.connected = true;
                    self.state.advertising = false;
                    debug!("[GAP] connected, handle {}", handle);
                }
                None
            }
            RadioEvent::DisconnectionComplete { status, handle, reason } => {
                if status.is_success() && handle == self.connection_handle {
                    self.connection_handle = INVALID_CONNECTION_HANDLE;
                    self.state.connected = false;
                    debug!("[GAP] disconnected, reason {}", reason);
                }
                None
            }
        }
    }

    /// Record that `timer` fired.
    ///
    /// Only queues the corresponding deferred event; safe to call from timer
    /// callback contexts that must not perform radio I/O. The queued work
    /// runs on the next [`Self::process_events`].
    pub fn timeout_elapsed(&mut self, timer: GapTimer) {
        let event = match timer {
            GapTimer::Advertising => DeferredEvent::AdvertisingTimeout,
            GapTimer::Scanning => DeferredEvent::ScanTimeout,
            GapTimer::ConnectionDelay => DeferredEvent::ConnectionDelayElapsed,
        };
        if self.deferred.try_send(event).is_err() {
            warn!("[GAP] deferred event queue full");
        }
    }

    /// Drain the deferred event queue and run the queued work.
    pub async fn process_events(&mut self) {
        while let Ok(event) = self.deferred.try_receive() {
            match event {
                DeferredEvent::AdvertisingTimeout => {
                    if self.stop_advertising().await.is_err() {
                        warn!("[GAP] advertising timeout: stop failed");
                    }
                }
                DeferredEvent::ScanTimeout => {
                    if self.stop_scan().await.is_err() {
                        warn!("[SCAN] scan timeout: stop failed");
                    }
                }
                DeferredEvent::ConnectionDelayElapsed => {
                    if self.state.connecting && self.create_connection().await.is_err() {
                        warn!("[GAP] deferred connection attempt failed");
                    }
                }
            }
        }
    }

    /// Reset the controller to its post-construction state.
    ///
    /// Stops nothing on the radio; callers reset the radio through their own
    /// channel and then call this to resynchronize.
    pub fn reset(&mut self) {
        self.state = GapState::default();
        self.timers.detach(GapTimer::Advertising);
        self.timers.detach(GapTimer::Scanning);
        self.timers.detach(GapTimer::ConnectionDelay);
        while self.deferred.try_receive().is_ok() {}
        self.connection_handle = INVALID_CONNECTION_HANDLE;
        self.advertising_policy = AdvertisingPolicyMode::default();
        self.scanning_policy = ScanningPolicyMode::default();
        self.whitelist.clear();
        self.addresses.reset();
        self.advertising_payload = AdvertisingData::new();
        self.scan_response_payload = AdvertisingData::new();
        self.appearance = 0;
        self.requested_adv_interval = ADV_INTERVAL_MIN;
        self.adv_interval = ADV_INTERVAL_MIN;
        self.scan_interval = SCAN_INTERVAL_MIN;
        self.scan_window = SCAN_INTERVAL_MIN;
        self.scan_timeout_s = 0;
        self.active_scanning = false;
        self.conn_interval_min = DEFAULT_CONN_INTERVAL;
        self.conn_interval_max = DEFAULT_CONN_INTERVAL;
        self.peer_address_type = AddressType::Public;
        self.peer_address = BleAddress::new([0; 6]);
    }

    // ------------------------------------------------------------------
    // Unimplemented surface

    /// Preferred connection parameter storage is not implemented.
    ///
    /// # Errors
    ///
    /// Always [`GapError::NotImplemented`].
    pub fn set_preferred_connection_parameters(
        &mut self,
        _params: &ConnectionParams,
    ) -> Result<(), GapError> {
        Err(GapError::NotImplemented)
    }

    /// Preferred connection parameter storage is not implemented.
    ///
    /// # Errors
    ///
    /// Always [`GapError::NotImplemented`].
    pub fn get_preferred_connection_parameters(&self) -> Result<ConnectionParams, GapError> {
        Err(GapError::NotImplemented)
    }

    /// Connection parameter negotiation is not implemented.
    ///
    /// # Errors
    ///
    /// Always [`GapError::NotImplemented`].
    pub fn update_connection_parameters(
        &mut self,
        _handle: u16,
        _params: &ConnectionParams,
    ) -> Result<(), GapError> {
        Err(GapError::NotImplemented)
    }

    /// The device name characteristic is not managed by this controller.
    ///
    /// # Errors
    ///
    /// Always [`GapError::NotImplemented`].
    pub fn set_device_name(&mut self, _name: &str) -> Result<(), GapError> {
        Err(GapError::NotImplemented)
    }

    /// The device name characteristic is not managed by this controller.
    ///
    /// # Errors
    ///
    /// Always [`GapError::NotImplemented`].
    pub fn get_device_name(&self) -> Result<&str, GapError> {
        Err(GapError::NotImplemented)
    }

    /// Direct TX power control is not implemented; the power amplifier is
    /// driven by the TX power element of the advertising payload instead.
    ///
    /// # Errors
    ///
    /// Always [`GapError::NotImplemented`].
    pub fn set_tx_power(&mut self, _dbm: i8) -> Result<(), GapError> {
        Err(GapError::NotImplemented)
    }

    /// Direct TX power control is not implemented.
    ///
    /// # Errors
    ///
    /// Always [`GapError::NotImplemented`].
    pub fn get_permitted_tx_power_values(&self) -> Result<&'static [i8], GapError> {
        Err(GapError::NotImplemented)
    }

    /// Reading the appearance back is not implemented; only updates are.
    ///
    /// # Errors
    ///
    /// Always [`GapError::NotImplemented`].
    pub fn get_appearance(&self) -> Result<u16, GapError> {
        Err(GapError::NotImplemented)
    }

    // ------------------------------------------------------------------

    /// Recompute the advertising interval actually used on the radio.
    ///
    /// A connected device must advertise inside the connection's spare time
    /// slots: the interval becomes the connection interval minus a guard,
    /// ignoring the requested value until disconnection.
    fn update_advertising_interval(&mut self) {
        self.adv_interval = if self.state.connected {
            let ms = conn_units_to_ms(self.conn_interval_min).saturating_sub(GUARD_INTERVAL_MS);
            ms_to_time_units(ms)
        } else {
            self.requested_adv_interval
        };
    }
}
