pub mod first_person_control_systems;
