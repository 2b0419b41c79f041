// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod client_link_repo_test;
pub mod job_repo_test;
pub mod models_test;
pub mod telemetry_test;
