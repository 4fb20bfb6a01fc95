// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
// Command modules for MediaGit CLI
pub mod add;
pub mod bisect;
pub mod branch;
pub mod cherrypick;
pub mod clone;
pub mod commit;
pub mod diff;
pub mod fetch;
pub mod filter;
pub mod fsck;
pub mod gc;
pub mod init;
pub mod install;
pub mod log;
pub mod merge;
pub mod pull;
pub mod push;
pub mod rebase;
pub mod rebase_state;
pub mod reflog;
pub mod remote;
pub mod reset;
pub mod revert;
pub mod show;
pub mod stash;
pub mod stats;
pub mod status;
pub mod tag;
pub mod track;
pub mod verify;

pub use add::AddCmd;
pub use bisect::BisectCmd;
pub use branch::BranchCmd;
pub use cherrypick::CherryPickCmd;
pub use clone::CloneCmd;
pub use commit::CommitCmd;
pub use diff::DiffCmd;
pub use fetch::FetchCmd;
pub use filter::FilterCmd;
pub use fsck::FsckCmd;
pub use gc::GcCmd;
pub use init::InitCmd;
pub use install::InstallCmd;
pub use log::LogCmd;
pub use merge::MergeCmd;
pub use pull::PullCmd;
pub use push::PushCmd;
pub use rebase::RebaseCmd;
pub use reflog::ReflogCmd;
pub use remote::RemoteCmd;
pub use reset::ResetCmd;
pub use revert::RevertCmd;
pub use show::ShowCmd;
pub use stash::StashCmd;
pub use stats::StatsCmd;
pub use status::StatusCmd;
pub use tag::TagCmd;
pub use track::{TrackCmd, UntrackCmd};
pub use verify::VerifyCmd;
