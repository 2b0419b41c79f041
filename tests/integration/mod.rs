// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod admin_test;
pub mod auth_test;
pub mod billing_test;
pub mod catalog_test;
pub mod chat_test;
pub mod health_check;
pub mod helpers;
pub mod invite_test;
pub mod jobs_test;
pub mod tenancy_test;
