//! System inspection commands: `df`, `sysmon`, `ps`.
//!
//! These read host state through `sysinfo` and are strictly best-effort:
//! a metric the platform cannot provide renders as `unavailable` rather
//! than failing the command.

use sysinfo::{Disks, System};

use burrow_types::error::Result;

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

pub fn register_system_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(DfCmd));
    reg.register(Box::new(SysmonCmd));
    reg.register(Box::new(PsCmd));
}

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn gb(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

// ---------------------------------------------------------------------------
// df
// ---------------------------------------------------------------------------

struct DfCmd;
impl Command for DfCmd {
    fn name(&self) -> &str {
        "df"
    }
    fn description(&self) -> &str {
        "Show disk usage for the filesystem holding the working root"
    }
    fn usage(&self) -> &str {
        "df"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let disks = Disks::new_with_refreshed_list();
        // The disk whose mount point is the longest prefix of the root is
        // the filesystem the sandbox actually lives on.
        let best = disks
            .list()
            .iter()
            .filter(|d| env.sandbox.root().starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len());
        let Some(disk) = best else {
            return Ok(CommandOutput::Text("disk usage unavailable".to_string()));
        };
        let total = disk.total_space();
        let free = disk.available_space();
        let used = total.saturating_sub(free);
        Ok(CommandOutput::Text(format!(
            "{} total={:.2}G used={:.2}G free={:.2}G",
            disk.mount_point().display(),
            gb(total),
            gb(used),
            gb(free),
        )))
    }
}

// ---------------------------------------------------------------------------
// sysmon
// ---------------------------------------------------------------------------

struct SysmonCmd;
impl Command for SysmonCmd {
    fn name(&self) -> &str {
        "sysmon"
    }
    fn description(&self) -> &str {
        "Show a host overview: uptime, load, memory"
    }
    fn usage(&self) -> &str {
        "sysmon"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut sys = System::new();
        sys.refresh_memory();

        let host = System::host_name().unwrap_or_else(|| "unavailable".to_string());
        let os = System::long_os_version()
            .or_else(System::name)
            .unwrap_or_else(|| "unavailable".to_string());
        let uptime = format_uptime(System::uptime());
        let load = System::load_average();

        let mut out = String::new();
        out.push_str(&format!("host:   {host}\n"));
        out.push_str(&format!("os:     {os}\n"));
        out.push_str(&format!("uptime: {uptime}\n"));
        out.push_str(&format!(
            "load:   {:.2} {:.2} {:.2}\n",
            load.one, load.five, load.fifteen
        ));
        out.push_str(&format!(
            "memory: {:.2}G / {:.2}G\n",
            gb(sys.used_memory()),
            gb(sys.total_memory()),
        ));
        if sys.total_swap() > 0 {
            out.push_str(&format!(
                "swap:   {:.2}G / {:.2}G\n",
                gb(sys.used_swap()),
                gb(sys.total_swap()),
            ));
        } else {
            out.push_str("swap:   none\n");
        }
        Ok(CommandOutput::Text(out.trim_end().to_string()))
    }
}

fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let mins = (secs % 3600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {mins}m")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

// ---------------------------------------------------------------------------
// ps
// ---------------------------------------------------------------------------

struct PsCmd;
impl Command for PsCmd {
    fn name(&self) -> &str {
        "ps"
    }
    fn description(&self) -> &str {
        "List running processes"
    }
    fn usage(&self) -> &str {
        "ps"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let sys = System::new_all();
        let total_mem = sys.total_memory().max(1);

        let mut rows: Vec<(u32, String, f32, f64)> = sys
            .processes()
            .iter()
            .map(|(pid, proc_)| {
                (
                    pid.as_u32(),
                    proc_.name().to_string(),
                    proc_.cpu_usage(),
                    proc_.memory() as f64 / total_mem as f64 * 100.0,
                )
            })
            .collect();
        rows.sort_by_key(|(pid, ..)| *pid);

        let mut out = format!("{:>8}  {:5}  {:5}  COMMAND\n", "PID", "CPU%", "MEM%");
        for (pid, name, cpu, mem) in rows {
            out.push_str(&format!("{pid:>8}  {cpu:5.1}  {mem:5.1}  {name}\n"));
        }
        Ok(CommandOutput::Text(out.trim_end().to_string()))
    }
}
