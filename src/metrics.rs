use crate::errors::ReguiError;
use redis::ConnectionLike;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Campos crudos devueltos por el comando `INFO`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerInfo {
    fields: HashMap<String, String>,
}

impl ServerInfo {
    /// Interpreta la salida de `INFO`: líneas `campo:valor`, secciones que
    /// empiezan con `#` y líneas vacías.
    pub fn parse(raw: &str) -> Self {
        let fields = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn get_u64(&self, name: &str) -> u64 {
        self.get(name)
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(0)
    }

    /// Suma `keys=` de todas las líneas `dbN` del keyspace.
    pub fn total_keys(&self) -> u64 {
        self.fields
            .iter()
            .filter(|(name, _)| {
                name.strip_prefix("db")
                    .is_some_and(|index| index.parse::<u32>().is_ok())
            })
            .filter_map(|(_, value)| {
                value
                    .split(',')
                    .filter_map(|field| field.split_once('='))
                    .find(|(name, _)| *name == "keys")
                    .and_then(|(_, count)| count.parse::<u64>().ok())
            })
            .sum()
    }
}

/// Ejecuta `INFO` y devuelve sus campos.
pub fn fetch_info(conn: &mut dyn ConnectionLike) -> Result<ServerInfo, ReguiError> {
    let raw: String = redis::cmd("INFO").query(conn)?;
    Ok(ServerInfo::parse(&raw))
}

/// Métricas que se muestran en el panel izquierdo. Se reemplaza entera en cada ciclo.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub version: String,
    pub uptime: Duration,
    pub clients: u64,
    /// Memoria usada por el servidor, en bytes.
    pub used_memory: u64,
    pub ops_per_sec: f64,
    /// Porcentaje de aciertos sobre el keyspace (0 a 100).
    pub hit_rate: f64,
    pub total_keys: u64,
}

impl MetricsSnapshot {
    pub fn uptime_label(&self) -> String {
        let secs = self.uptime.as_secs();
        format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3_600)
    }

    pub fn memory_label(&self) -> String {
        format!("{:.1} MB", self.used_memory as f64 / (1024.0 * 1024.0))
    }

    pub fn ops_label(&self) -> String {
        format!("{:.1}", self.ops_per_sec)
    }

    pub fn hit_rate_label(&self) -> String {
        format!("{:.1}%", self.hit_rate)
    }
}

#[derive(Debug, Clone, Copy)]
struct CounterSample {
    total_commands: u64,
    taken_at: Instant,
}

/// Calcula las métricas derivadas a partir de los contadores crudos.
///
/// Guarda únicamente la muestra anterior para poder calcular la tasa de
/// comandos por segundo entre dos consultas consecutivas.
#[derive(Debug, Default)]
pub struct MetricsSampler {
    previous: Option<CounterSample>,
}

impl MetricsSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, info: &ServerInfo, now: Instant) -> MetricsSnapshot {
        let total_commands = info.get_u64("total_commands_processed");
        let uptime_secs = info.get_u64("uptime_in_seconds");

        let ops_per_sec = match self.previous {
            Some(previous) if total_commands >= previous.total_commands => {
                let elapsed = now.saturating_duration_since(previous.taken_at).as_secs_f64();
                if elapsed > 0.0 {
                    (total_commands - previous.total_commands) as f64 / elapsed
                } else {
                    lifetime_rate(total_commands, uptime_secs)
                }
            }
            _ => lifetime_rate(total_commands, uptime_secs),
        };

        self.previous = Some(CounterSample {
            total_commands,
            taken_at: now,
        });

        let hits = info.get_u64("keyspace_hits");
        let misses = info.get_u64("keyspace_misses");
        let hit_rate = if hits + misses > 0 {
            hits as f64 / (hits + misses) as f64 * 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            version: info.get("redis_version").unwrap_or("-").to_string(),
            uptime: Duration::from_secs(uptime_secs),
            clients: info.get_u64("connected_clients"),
            used_memory: info.get_u64("used_memory"),
            ops_per_sec,
            hit_rate,
            total_keys: info.total_keys(),
        }
    }

    /// Olvida la muestra anterior, por ejemplo al cambiar de servidor.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

fn lifetime_rate(total_commands: u64, uptime_secs: u64) -> f64 {
    if uptime_secs > 0 {
        total_commands as f64 / uptime_secs as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: &str = "# Server\r\n\
redis_version:7.2.4\r\n\
uptime_in_seconds:183600\r\n\
\r\n\
# Clients\r\n\
connected_clients:3\r\n\
\r\n\
# Memory\r\n\
used_memory:2097152\r\n\
\r\n\
# Stats\r\n\
total_commands_processed:1000\r\n\
keyspace_hits:75\r\n\
keyspace_misses:25\r\n\
\r\n\
# Keyspace\r\n\
db0:keys=12,expires=2,avg_ttl=0\r\n\
db3:keys=5,expires=0,avg_ttl=0\r\n";

    fn info_with_commands(total: u64) -> ServerInfo {
        ServerInfo::parse(&INFO.replace(
            "total_commands_processed:1000",
            &format!("total_commands_processed:{}", total),
        ))
    }

    #[test]
    fn test_parse_info_fields() {
        let info = ServerInfo::parse(INFO);
        assert_eq!(info.get("redis_version"), Some("7.2.4"));
        assert_eq!(info.get_u64("connected_clients"), 3);
        assert_eq!(info.get("# Server"), None);
        assert_eq!(info.get_u64("missing"), 0);
    }

    #[test]
    fn test_total_keys_sums_every_database() {
        let info = ServerInfo::parse(INFO);
        assert_eq!(info.total_keys(), 17);
        assert_eq!(ServerInfo::parse("").total_keys(), 0);
    }

    #[test]
    fn test_first_sample_uses_lifetime_rate() {
        let mut sampler = MetricsSampler::new();
        let snapshot = sampler.sample(&ServerInfo::parse(INFO), Instant::now());

        assert_eq!(snapshot.version, "7.2.4");
        assert_eq!(snapshot.clients, 3);
        assert_eq!(snapshot.total_keys, 17);
        assert!((snapshot.ops_per_sec - 1000.0 / 183_600.0).abs() < 1e-9);
        assert!((snapshot.hit_rate - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_next_sample_uses_counter_delta() {
        let mut sampler = MetricsSampler::new();
        let start = Instant::now();
        sampler.sample(&info_with_commands(1000), start);

        let snapshot = sampler.sample(&info_with_commands(1400), start + Duration::from_secs(2));
        assert!((snapshot.ops_per_sec - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_counter_reset_falls_back_to_lifetime_rate() {
        let mut sampler = MetricsSampler::new();
        let start = Instant::now();
        sampler.sample(&info_with_commands(5000), start);

        let snapshot = sampler.sample(&info_with_commands(1000), start + Duration::from_secs(2));
        assert!((snapshot.ops_per_sec - 1000.0 / 183_600.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_forgets_previous_sample() {
        let mut sampler = MetricsSampler::new();
        let start = Instant::now();
        sampler.sample(&info_with_commands(1000), start);
        sampler.reset();

        let snapshot = sampler.sample(&info_with_commands(1400), start + Duration::from_secs(2));
        assert!((snapshot.ops_per_sec - 1400.0 / 183_600.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_rate_without_lookups_is_zero() {
        let mut sampler = MetricsSampler::new();
        let snapshot = sampler.sample(&ServerInfo::parse("uptime_in_seconds:0"), Instant::now());
        assert_eq!(snapshot.hit_rate, 0.0);
        assert_eq!(snapshot.ops_per_sec, 0.0);
        assert_eq!(snapshot.version, "-");
    }

    #[test]
    fn test_labels() {
        let mut sampler = MetricsSampler::new();
        let snapshot = sampler.sample(&ServerInfo::parse(INFO), Instant::now());

        assert_eq!(snapshot.uptime_label(), "2d 3h");
        assert_eq!(snapshot.memory_label(), "2.0 MB");
        assert_eq!(snapshot.hit_rate_label(), "75.0%");
        assert_eq!(snapshot.ops_label(), "0.0");
    }
}
