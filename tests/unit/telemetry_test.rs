// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use briefdesk::utils::telemetry::init_telemetry;

#[test]
fn test_repeated_initialization_is_ignored() {
    init_telemetry();
    init_telemetry();
    tracing::info!("telemetry initialized");
}
