// This file is part of blush, a bash-leaning POSIX shell.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Job table
//!
//! Asynchronous commands are recorded here, identified by small integers.
//! The table is polled at synchronization points; finished jobs are
//! reported once (in interactive mode) and then removed.

use crate::semantics::ExitStatus;
use crate::system::{Pid, RealSystem, WaitOutcome};
use slab::Slab;

/// State of a job
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobState {
    /// At least one process of the job is runnable.
    Running,
    /// The job was stopped by a signal.
    Stopped,
    /// All processes of the job exited.
    Done(ExitStatus),
}

/// Job table entry
#[derive(Clone, Debug)]
pub struct Job {
    /// Process ID of the job's process (group leader)
    pub pid: Pid,
    /// Current state
    pub state: JobState,
    /// Source text of the command, for reporting
    pub command: String,
    /// Whether the state change has been reported to the user
    pub state_reported: bool,
}

/// Collection of jobs
#[derive(Clone, Debug, Default)]
pub struct JobSet {
    jobs: Slab<Job>,
}

impl JobSet {
    /// Creates an empty job set.
    #[must_use]
    pub fn new() -> JobSet {
        Default::default()
    }

    /// Adds a running job, returning its job number.
    pub fn add(&mut self, pid: Pid, command: String) -> usize {
        self.jobs.insert(Job {
            pid,
            state: JobState::Running,
            command,
            state_reported: false,
        }) + 1
    }

    /// Returns the job with the given process ID.
    #[must_use]
    pub fn find_by_pid(&self, pid: Pid) -> Option<usize> {
        self.jobs
            .iter()
            .find(|(_, job)| job.pid == pid)
            .map(|(index, _)| index + 1)
    }

    /// Returns the number of jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns true if there are no jobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Updates job states with non-blocking waits.
    pub fn poll(&mut self, system: &RealSystem) {
        for (_, job) in self.jobs.iter_mut() {
            if matches!(job.state, JobState::Done(_)) {
                continue;
            }
            loop {
                match system.wait_any_nonblocking(job.pid) {
                    Ok(Some(WaitOutcome::Exited(_, status))) => {
                        job.state = JobState::Done(status);
                        job.state_reported = false;
                    }
                    Ok(Some(WaitOutcome::Signaled(_, signal))) => {
                        job.state = JobState::Done(ExitStatus::from_signal(signal));
                        job.state_reported = false;
                    }
                    Ok(Some(WaitOutcome::Stopped(_, _))) => {
                        job.state = JobState::Stopped;
                        job.state_reported = false;
                        continue;
                    }
                    Ok(Some(WaitOutcome::Continued(_))) => {
                        job.state = JobState::Running;
                        continue;
                    }
                    Ok(None) | Err(_) => {}
                }
                break;
            }
        }
    }

    /// Drains finished jobs whose state has not been reported, returning
    /// `(job_number, job)` pairs for display.
    pub fn take_finished(&mut self) -> Vec<(usize, Job)> {
        let finished: Vec<usize> = self
            .jobs
            .iter()
            .filter(|(_, job)| matches!(job.state, JobState::Done(_)))
            .map(|(index, _)| index)
            .collect();
        finished
            .into_iter()
            .map(|index| (index + 1, self.jobs.remove(index)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_numbers_start_at_one() {
        let mut jobs = JobSet::new();
        let first = jobs.add(100, "sleep 1 &".to_owned());
        let second = jobs.add(200, "sleep 2 &".to_owned());
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(jobs.find_by_pid(200), Some(2));
    }

    #[test]
    fn finished_jobs_are_drained() {
        let mut jobs = JobSet::new();
        jobs.add(100, "a &".to_owned());
        let index = jobs.add(200, "b &".to_owned());
        jobs.jobs[index - 1].state = JobState::Done(ExitStatus::SUCCESS);
        let finished = jobs.take_finished();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].0, 2);
        assert_eq!(jobs.len(), 1);
    }
}
