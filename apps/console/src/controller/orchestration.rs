//! Forwarding console actions to the mission command queue.

use mission_core::{MissionCommand, MissionError, MissionHandle};
use registry::CityRegistry;
use shared::domain::CityId;

use super::commands::city_arg;

/// Rewrites city arguments to registry ids. An argument that is not an id is
/// matched against city names in the same normalised form, so `New York City`
/// finds `new_york`. Returns the argument that matched nothing.
pub fn resolve_city_args(
    cmd: MissionCommand,
    registry: &CityRegistry,
) -> Result<MissionCommand, CityId> {
    let resolve = |id: CityId| -> Result<CityId, CityId> {
        if registry.contains(&id) {
            return Ok(id);
        }
        registry
            .list_cities()
            .iter()
            .find(|city| city_arg(&city.name) == id)
            .map(|city| city.id.clone())
            .ok_or(id)
    };
    Ok(match cmd {
        MissionCommand::ActivateCity(id) => MissionCommand::ActivateCity(resolve(id)?),
        MissionCommand::ActivatePrimary(id) => MissionCommand::ActivatePrimary(resolve(id)?),
        MissionCommand::SetSecondary(Some(id)) => {
            MissionCommand::SetSecondary(Some(resolve(id)?))
        }
        other => other,
    })
}

/// Never blocks the input loop; queue failures end up in `status`.
pub fn dispatch_mission_command(handle: &MissionHandle, cmd: MissionCommand, status: &mut String) {
    let cmd_name = cmd.name();
    match handle.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued console->mission command"),
        Err(MissionError::QueueFull) => {
            *status = "Mission command queue is full; please retry".to_string();
        }
        Err(err) => {
            *status = format!("Mission orchestrator unavailable ({err}); restart the console");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_arguments_resolve_by_id_or_display_name() {
        let registry = CityRegistry::builtin();
        let resolved = |raw: &str| {
            resolve_city_args(MissionCommand::ActivateCity(city_arg(raw)), &registry)
        };

        assert_eq!(
            resolved("tokyo"),
            Ok(MissionCommand::ActivateCity(CityId::from("tokyo")))
        );
        assert_eq!(
            resolved("New York City"),
            Ok(MissionCommand::ActivateCity(CityId::from("new_york")))
        );
        assert_eq!(
            resolved("São Paulo"),
            Ok(MissionCommand::ActivateCity(CityId::from("sao_paulo")))
        );
        assert_eq!(resolved("Atlantis"), Err(CityId::from("atlantis")));
    }

    #[test]
    fn secondary_and_cityless_commands_pass_through() {
        let registry = CityRegistry::builtin();
        assert_eq!(
            resolve_city_args(
                MissionCommand::SetSecondary(Some(city_arg("new york city"))),
                &registry
            ),
            Ok(MissionCommand::SetSecondary(Some(CityId::from("new_york"))))
        );
        assert_eq!(
            resolve_city_args(MissionCommand::SetSecondary(None), &registry),
            Ok(MissionCommand::SetSecondary(None))
        );
        assert_eq!(
            resolve_city_args(MissionCommand::FindOpposite, &registry),
            Ok(MissionCommand::FindOpposite)
        );
    }
}
